//! Gemini adapter: secondary provider, `generateContent` REST API.
//!
//! Supports inline binary attachments (used for direct file analysis).

use std::borrow::Cow;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::http::{build_client, send_with_retry};
use crate::ai::{AiProvider, GenerateOptions, ProviderError, ProviderKind};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Hardcoded to keep report quality stable across deployments.
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: Cow<'a, str>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate, if non-empty.
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Gemini has no separate system role on this endpoint; the system prompt is
/// folded into the user text.
fn compose_text<'a>(prompt: &'a str, options: &GenerateOptions) -> Cow<'a, str> {
    match options.system_prompt.as_deref() {
        Some(system) => Cow::Owned(format!("System: {system}\n\nUser: {prompt}")),
        None => Cow::Borrowed(prompt),
    }
}

fn build_request<'a>(prompt: &'a str, options: &'a GenerateOptions) -> GeminiRequest<'a> {
    let mut parts = Vec::with_capacity(2);
    if let Some(binary) = &options.inline_binary {
        parts.push(Part::Inline {
            inline_data: InlineData {
                mime_type: &binary.mime_type,
                data: &binary.base64_data,
            },
        });
    }
    parts.push(Part::Text {
        text: compose_text(prompt, options),
    });

    GeminiRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        generation_config: GenerationConfig {
            temperature: options.effective_temperature(),
            max_output_tokens: options.max_tokens,
            response_mime_type: options.json_mode.then_some("application/json"),
        },
    }
}

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client()?,
            api_key,
        })
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    fn supports_inline_binary(&self) -> bool {
        true
    }

    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        let url = format!("{GEMINI_API_BASE}/{GEMINI_MODEL}:generateContent");
        let request_body = build_request(prompt, options);

        let body = send_with_retry(ProviderKind::Gemini, || {
            self.client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&request_body)
        })
        .await?;

        let response: GeminiResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        response.into_text().ok_or(ProviderError::EmptyContent)
    }
}
