//! In-process provider fake used by service, pipeline and handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ai::{AiProvider, GenerateOptions, ProviderError, ProviderKind};

enum Reply {
    Text(String),
    Fail(String),
    Capability,
}

/// Returns the same scripted reply on every call and records what it saw.
pub struct ScriptedProvider {
    kind: ProviderKind,
    reply: Reply,
    credentials: bool,
    binary: bool,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    last_options: Mutex<Option<GenerateOptions>>,
}

impl ScriptedProvider {
    fn new(kind: ProviderKind, reply: Reply) -> Self {
        Self {
            kind,
            reply,
            credentials: true,
            binary: false,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            last_options: Mutex::new(None),
        }
    }

    pub fn ok(kind: ProviderKind, text: &str) -> Self {
        Self::new(kind, Reply::Text(text.to_string()))
    }

    /// Fails every call with a 503 carrying `message`.
    pub fn failing(kind: ProviderKind, message: &str) -> Self {
        Self::new(kind, Reply::Fail(message.to_string()))
    }

    pub fn capability_error(kind: ProviderKind) -> Self {
        Self::new(kind, Reply::Capability)
    }

    pub fn without_credentials(mut self) -> Self {
        self.credentials = false;
        self
    }

    pub fn with_binary_support(mut self) -> Self {
        self.binary = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_options(&self) -> Option<GenerateOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn has_credentials(&self) -> bool {
        self.credentials
    }

    fn supports_inline_binary(&self) -> bool {
        self.binary
    }

    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        *self.last_options.lock().unwrap() = Some(options.clone());

        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(message) => Err(ProviderError::Api {
                status: 503,
                message: message.clone(),
            }),
            Reply::Capability => Err(ProviderError::Capability {
                provider: self.kind,
                capability: "inline binary attachments",
            }),
        }
    }
}
