/// AI generation layer: the single point of entry for all model calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Every caller goes through `GenerationService`, which owns the ordered
/// failover between the configured adapters (Groq first, Gemini second).
use std::fmt;

use base64::Engine;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

pub mod error;
pub mod gemini;
pub mod groq;
mod http;
pub mod prompts;
pub mod provider;
pub mod service;
#[cfg(test)]
pub mod testing;

pub use error::{CapabilityError, ProviderError};
pub use provider::AiProvider;
pub use service::{GenerationService, ServiceResult};

/// Temperature used when a caller does not set one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Identifies a generation backend. Serialized lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Groq,
    Gemini,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Groq => f.write_str("Groq"),
            ProviderKind::Gemini => f.write_str("Gemini"),
        }
    }
}

/// A file attached to a request and sent to the model as-is.
#[derive(Debug, Clone)]
pub struct InlineBinary {
    pub mime_type: String,
    pub base64_data: String,
}

impl InlineBinary {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64_data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// Per-call generation options. Built fresh for every request.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub json_mode: bool,
    pub inline_binary: Option<InlineBinary>,
}

impl GenerateOptions {
    pub fn json() -> Self {
        Self {
            json_mode: true,
            ..Self::default()
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_inline_binary(mut self, inline_binary: InlineBinary) -> Self {
        self.inline_binary = Some(inline_binary);
        self
    }

    /// Temperature sent to providers, always within [0, 1].
    pub fn effective_temperature(&self) -> f32 {
        let temperature = self.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if temperature.is_nan() {
            DEFAULT_TEMPERATURE
        } else {
            temperature.clamp(0.0, 1.0)
        }
    }
}

/// A typed model output, checked at the `GenerationService` boundary right
/// after parsing. A validation failure counts as a parse failure and
/// triggers failover like any other provider error.
pub trait StructuredOutput: DeserializeOwned + Send + Sized {
    fn validate(self) -> Result<Self, String> {
        Ok(self)
    }
}

impl StructuredOutput for serde_json::Value {}

/// Reads an explicit `null` as the type's default. Pair with
/// `#[serde(default)]` so a missing key behaves the same way.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
