//! Provider trait: the uniform interface every generation backend implements.

use async_trait::async_trait;
use serde_json::Value;

use crate::ai::{strip_json_fences, GenerateOptions, ProviderError, ProviderKind};

/// One external text/JSON generation backend.
///
/// Adapters never catch or suppress errors; typed failures propagate to
/// `GenerationService`, which decides on failover. Implementations hold only
/// credentials and an HTTP client and are shared across runs via `Arc`.
#[async_trait]
pub trait AiProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Whether an API key is configured. A secondary without credentials is
    /// never used as a fallback.
    fn has_credentials(&self) -> bool;

    /// Whether requests may carry `inline_binary` attachments.
    fn supports_inline_binary(&self) -> bool {
        false
    }

    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError>;

    /// Calls `generate_text` in JSON mode and parses the reply, tolerating a
    /// markdown code fence around the payload.
    async fn generate_json(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<Value, ProviderError> {
        let options = GenerateOptions {
            json_mode: true,
            ..options.clone()
        };
        let text = self.generate_text(prompt, &options).await?;
        parse_json_text(&text)
    }
}

pub fn parse_json_text(text: &str) -> Result<Value, ProviderError> {
    serde_json::from_str(strip_json_fences(text)).map_err(|e| ProviderError::Parse(e.to_string()))
}
