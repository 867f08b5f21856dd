//! Groq adapter: primary provider, OpenAI-compatible chat completions.
//!
//! Text-only: requests carrying inline binary are rejected with a capability
//! error before any network call.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::http::{build_client, send_with_retry};
use crate::ai::{AiProvider, GenerateOptions, ProviderError, ProviderKind};

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// Hardcoded to keep report quality stable across deployments.
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if non-empty.
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
    }
}

fn build_request<'a>(prompt: &'a str, options: &'a GenerateOptions) -> ChatRequest<'a> {
    ChatRequest {
        model: GROQ_MODEL,
        messages: vec![
            ChatMessage {
                role: "system",
                content: options
                    .system_prompt
                    .as_deref()
                    .unwrap_or(DEFAULT_SYSTEM_PROMPT),
            },
            ChatMessage {
                role: "user",
                content: prompt,
            },
        ],
        temperature: options.effective_temperature(),
        max_tokens: options.max_tokens,
        response_format: options.json_mode.then_some(ResponseFormat {
            format_type: "json_object",
        }),
    }
}

#[derive(Clone)]
pub struct GroqProvider {
    client: Client,
    api_key: String,
}

impl GroqProvider {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client()?,
            api_key,
        })
    }
}

#[async_trait]
impl AiProvider for GroqProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        if options.inline_binary.is_some() {
            return Err(ProviderError::Capability {
                provider: ProviderKind::Groq,
                capability: "inline binary attachments",
            });
        }

        let request_body = build_request(prompt, options);
        let body = send_with_retry(ProviderKind::Groq, || {
            self.client
                .post(GROQ_API_URL)
                .bearer_auth(&self.api_key)
                .json(&request_body)
        })
        .await?;

        let response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        if let Some(usage) = &response.usage {
            debug!(
                "Groq call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        response.into_text().ok_or(ProviderError::EmptyContent)
    }
}
