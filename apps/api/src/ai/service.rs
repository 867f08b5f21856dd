//! Generation Service: ordered provider failover.
//!
//! Flow: primary → (on failure, if permitted) secondary → tagged result.
//!
//! Not load-balanced and never parallel. Provider-level failures are encoded
//! in `ServiceResult`; the only `Err` a caller sees is `CapabilityError`.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::ai::{
    AiProvider, CapabilityError, GenerateOptions, ProviderError, ProviderKind, StructuredOutput,
};

/// Tagged outcome of a generation call. Check `success` before reading `data`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub provider_used: ProviderKind,
}

impl<T> ServiceResult<T> {
    fn ok(data: T, provider_used: ProviderKind) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            provider_used,
        }
    }

    fn failed(error: String, provider_used: ProviderKind) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            provider_used,
        }
    }

    /// Converts into a plain `Result`, keeping the error string on failure.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.error.unwrap_or_else(|| "Generation failed".to_string())),
        }
    }
}

/// The single generation entry point. Constructed once at startup and shared
/// via `Arc` with the pipeline and the HTTP handlers.
pub struct GenerationService {
    primary: Arc<dyn AiProvider>,
    secondary: Option<Arc<dyn AiProvider>>,
    fallback_disabled: bool,
}

impl GenerationService {
    pub fn new(
        primary: Arc<dyn AiProvider>,
        secondary: Option<Arc<dyn AiProvider>>,
        fallback_disabled: bool,
    ) -> Self {
        Self {
            primary,
            secondary,
            fallback_disabled,
        }
    }

    pub fn primary_kind(&self) -> ProviderKind {
        self.primary.kind()
    }

    /// Free-form text generation with failover.
    pub async fn generate_content(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<ServiceResult<String>, CapabilityError> {
        self.run(options, |provider| provider.generate_text(prompt, options))
            .await
    }

    /// JSON generation with failover. Each attempt is parsed into `T` and
    /// validated here, so malformed output fails over instead of leaking
    /// partially-typed data to the caller.
    pub async fn generate_json<T: StructuredOutput>(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<ServiceResult<T>, CapabilityError> {
        let options = GenerateOptions {
            json_mode: true,
            ..options.clone()
        };
        self.run(&options, |provider| {
            attempt_structured::<T>(provider, prompt, &options)
        })
        .await
    }

    /// The secondary, if fallback is enabled and it holds credentials.
    fn usable_secondary(&self) -> Option<&dyn AiProvider> {
        self.secondary
            .as_deref()
            .filter(|s| !self.fallback_disabled && s.has_credentials())
    }

    /// Picks the providers able to serve `options`. Requests with inline
    /// binary only go to adapters that accept it, and the secondary is never
    /// a candidate unless fallback is permitted.
    fn chain_for(
        &self,
        options: &GenerateOptions,
    ) -> Result<(&dyn AiProvider, Option<&dyn AiProvider>), CapabilityError> {
        if options.inline_binary.is_none() {
            return Ok((&*self.primary, self.usable_secondary()));
        }

        let mut capable = std::iter::once(&*self.primary)
            .chain(self.usable_secondary())
            .filter(|p| p.supports_inline_binary());

        match capable.next() {
            Some(first) => Ok((first, capable.next())),
            None => Err(CapabilityError(
                "no usable provider accepts inline binary attachments".to_string(),
            )),
        }
    }

    async fn run<'a, T, F, Fut>(
        &'a self,
        options: &GenerateOptions,
        call: F,
    ) -> Result<ServiceResult<T>, CapabilityError>
    where
        F: Fn(&'a dyn AiProvider) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let (primary, secondary) = self.chain_for(options)?;

        info!("Generating with {}...", primary.kind());
        let primary_error = match call(primary).await {
            Ok(data) => return Ok(ServiceResult::ok(data, primary.kind())),
            Err(ProviderError::Capability {
                provider,
                capability,
            }) => {
                return Err(CapabilityError(format!(
                    "{provider} does not support {capability}"
                )))
            }
            Err(e) => e.to_string(),
        };
        warn!("{} failed: {}", primary.kind(), primary_error);

        let secondary = match secondary {
            Some(s) => s,
            None => {
                return Ok(ServiceResult::failed(
                    format!("{} failed: {}", primary.kind(), primary_error),
                    primary.kind(),
                ))
            }
        };

        info!("Falling back to {}...", secondary.kind());
        match call(secondary).await {
            Ok(data) => Ok(ServiceResult::ok(data, secondary.kind())),
            Err(ProviderError::Capability {
                provider,
                capability,
            }) => Err(CapabilityError(format!(
                "{provider} does not support {capability}"
            ))),
            Err(e) => {
                error!("{} fallback also failed: {}", secondary.kind(), e);
                Ok(ServiceResult::failed(
                    format!(
                        "Both providers failed. {}: {}. {}: {}",
                        primary.kind(),
                        primary_error,
                        secondary.kind(),
                        e
                    ),
                    secondary.kind(),
                ))
            }
        }
    }
}

async fn attempt_structured<T: StructuredOutput>(
    provider: &dyn AiProvider,
    prompt: &str,
    options: &GenerateOptions,
) -> Result<T, ProviderError> {
    let value = provider.generate_json(prompt, options).await?;
    decode_structured(value)
}

pub fn decode_structured<T: StructuredOutput>(value: Value) -> Result<T, ProviderError> {
    let parsed: T = serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
    parsed.validate().map_err(ProviderError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    use crate::ai::testing::ScriptedProvider;
    use crate::ai::InlineBinary;

    fn service(
        primary: &Arc<ScriptedProvider>,
        secondary: &Arc<ScriptedProvider>,
        fallback_disabled: bool,
    ) -> GenerationService {
        let secondary: Arc<dyn AiProvider> = secondary.clone();
        GenerationService::new(primary.clone(), Some(secondary), fallback_disabled)
    }

    #[derive(Debug, Deserialize)]
    struct Scores {
        score: u32,
    }

    impl StructuredOutput for Scores {
        fn validate(self) -> Result<Self, String> {
            if self.score > 100 {
                return Err(format!("score {} out of range", self.score));
            }
            Ok(self)
        }
    }

    #[tokio::test]
    async fn test_primary_success_never_touches_secondary() {
        let groq = Arc::new(ScriptedProvider::ok(ProviderKind::Groq, "from groq"));
        let gemini = Arc::new(ScriptedProvider::ok(ProviderKind::Gemini, "from gemini"));

        let result = service(&groq, &gemini, false)
            .generate_content("hello", &GenerateOptions::default())
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.data.as_deref(), Some("from groq"));
        assert_eq!(result.provider_used, ProviderKind::Groq);
        assert_eq!(groq.calls(), 1);
        assert_eq!(gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_once() {
        let groq = Arc::new(ScriptedProvider::failing(ProviderKind::Groq, "rate limit exceeded"));
        let gemini = Arc::new(ScriptedProvider::ok(ProviderKind::Gemini, "from gemini"));

        let result = service(&groq, &gemini, false)
            .generate_content("hello", &GenerateOptions::default())
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.data.as_deref(), Some("from gemini"));
        assert_eq!(result.provider_used, ProviderKind::Gemini);
        assert_eq!(groq.calls(), 1);
        assert_eq!(gemini.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_fail_reports_messages_in_order() {
        let groq = Arc::new(ScriptedProvider::failing(ProviderKind::Groq, "groq is down"));
        let gemini = Arc::new(ScriptedProvider::failing(ProviderKind::Gemini, "gemini quota"));

        let result = service(&groq, &gemini, false)
            .generate_content("hello", &GenerateOptions::default())
            .await
            .unwrap();

        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.provider_used, ProviderKind::Gemini);

        let error = result.error.unwrap();
        assert!(error.starts_with("Both providers failed. Groq: "), "{error}");
        let groq_at = error.find("groq is down").unwrap();
        let gemini_at = error.find("gemini quota").unwrap();
        assert!(groq_at < gemini_at);
        assert!(error.contains(". Gemini: "));
        assert_eq!(gemini.calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_disabled_returns_primary_failure() {
        let groq = Arc::new(ScriptedProvider::failing(ProviderKind::Groq, "boom"));
        let gemini = Arc::new(ScriptedProvider::ok(ProviderKind::Gemini, "unused"));

        let result = service(&groq, &gemini, true)
            .generate_content("hello", &GenerateOptions::default())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.provider_used, ProviderKind::Groq);
        assert!(result.error.unwrap().starts_with("Groq failed: "));
        assert_eq!(gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_secondary_without_credentials_is_skipped() {
        let groq = Arc::new(ScriptedProvider::failing(ProviderKind::Groq, "boom"));
        let gemini = Arc::new(ScriptedProvider::ok(ProviderKind::Gemini, "unused").without_credentials());

        let result = service(&groq, &gemini, false)
            .generate_json::<Value>("hello", &GenerateOptions::json())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.provider_used, ProviderKind::Groq);
        assert_eq!(gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_secondary_configured() {
        let groq = Arc::new(ScriptedProvider::failing(ProviderKind::Groq, "boom"));
        let service = GenerationService::new(groq.clone(), None, false);

        let result = service
            .generate_content("hello", &GenerateOptions::default())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Groq failed: API error (status 503): boom"));
    }

    #[tokio::test]
    async fn test_generate_json_strips_fences() {
        let groq = Arc::new(ScriptedProvider::ok(ProviderKind::Groq, "```json\n{\"a\":1}\n```"));
        let gemini = Arc::new(ScriptedProvider::ok(ProviderKind::Gemini, "{}"));

        let result = service(&groq, &gemini, false)
            .generate_json::<Value>("prompt", &GenerateOptions::default())
            .await
            .unwrap();

        assert_eq!(result.data.unwrap(), serde_json::json!({"a": 1}));
        assert!(groq.last_options().unwrap().json_mode);
    }

    #[tokio::test]
    async fn test_unparseable_json_triggers_fallback() {
        let groq = Arc::new(ScriptedProvider::ok(ProviderKind::Groq, "I cannot do that."));
        let gemini = Arc::new(ScriptedProvider::ok(ProviderKind::Gemini, "{\"score\": 80}"));

        let result = service(&groq, &gemini, false)
            .generate_json::<Scores>("prompt", &GenerateOptions::json())
            .await
            .unwrap();

        assert_eq!(result.provider_used, ProviderKind::Gemini);
        assert_eq!(result.data.unwrap().score, 80);
    }

    #[tokio::test]
    async fn test_validation_failure_is_a_parse_error() {
        let groq = Arc::new(ScriptedProvider::ok(ProviderKind::Groq, "{\"score\": 400}"));
        let gemini = Arc::new(ScriptedProvider::ok(ProviderKind::Gemini, "{\"score\": 401}"));

        let result = service(&groq, &gemini, false)
            .generate_json::<Scores>("prompt", &GenerateOptions::json())
            .await
            .unwrap();

        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.contains("score 400 out of range"), "{error}");
        assert!(error.contains("score 401 out of range"), "{error}");
    }

    #[tokio::test]
    async fn test_inline_binary_routes_to_capable_provider() {
        let groq = Arc::new(ScriptedProvider::ok(ProviderKind::Groq, "{\"from\": \"groq\"}"));
        let gemini = Arc::new(
            ScriptedProvider::ok(ProviderKind::Gemini, "{\"from\": \"gemini\"}").with_binary_support(),
        );
        let options = GenerateOptions::json()
            .with_inline_binary(InlineBinary::from_bytes("application/pdf", b"%PDF"));

        let result = service(&groq, &gemini, false)
            .generate_json::<Value>("extract", &options)
            .await
            .unwrap();

        assert_eq!(result.provider_used, ProviderKind::Gemini);
        assert_eq!(groq.calls(), 0);
        assert_eq!(gemini.calls(), 1);
    }

    #[tokio::test]
    async fn test_inline_binary_without_capable_provider_fails_fast() {
        let groq = Arc::new(ScriptedProvider::ok(ProviderKind::Groq, "{}"));
        let gemini = Arc::new(ScriptedProvider::ok(ProviderKind::Gemini, "{}"));
        let options = GenerateOptions::json()
            .with_inline_binary(InlineBinary::from_bytes("application/pdf", b"%PDF"));

        let err = service(&groq, &gemini, false)
            .generate_json::<Value>("extract", &options)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("inline binary"));
        assert_eq!(groq.calls(), 0);
        assert_eq!(gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_inline_binary_skips_secondary_without_credentials() {
        let groq = Arc::new(ScriptedProvider::ok(ProviderKind::Groq, "{}"));
        let gemini = Arc::new(
            ScriptedProvider::ok(ProviderKind::Gemini, "{}")
                .with_binary_support()
                .without_credentials(),
        );
        let options = GenerateOptions::json()
            .with_inline_binary(InlineBinary::from_bytes("application/pdf", b"%PDF"));

        let err = service(&groq, &gemini, false)
            .generate_json::<Value>("extract", &options)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("inline binary"));
        assert_eq!(groq.calls(), 0);
        assert_eq!(gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_inline_binary_respects_disabled_fallback() {
        let groq = Arc::new(ScriptedProvider::ok(ProviderKind::Groq, "{}"));
        let gemini = Arc::new(ScriptedProvider::ok(ProviderKind::Gemini, "{}").with_binary_support());
        let options = GenerateOptions::json()
            .with_inline_binary(InlineBinary::from_bytes("application/pdf", b"%PDF"));

        let err = service(&groq, &gemini, true)
            .generate_json::<Value>("extract", &options)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("inline binary"));
        assert_eq!(groq.calls(), 0);
        assert_eq!(gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_inline_binary_on_capable_primary_never_falls_back_when_disabled() {
        let groq = Arc::new(ScriptedProvider::failing(ProviderKind::Groq, "boom").with_binary_support());
        let gemini = Arc::new(ScriptedProvider::ok(ProviderKind::Gemini, "{}").with_binary_support());
        let options = GenerateOptions::json()
            .with_inline_binary(InlineBinary::from_bytes("application/pdf", b"%PDF"));

        let result = service(&groq, &gemini, true)
            .generate_json::<Value>("extract", &options)
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.provider_used, ProviderKind::Groq);
        assert_eq!(gemini.calls(), 0);
    }

    #[tokio::test]
    async fn test_adapter_capability_error_is_not_failed_over() {
        let groq = Arc::new(ScriptedProvider::capability_error(ProviderKind::Groq));
        let gemini = Arc::new(ScriptedProvider::ok(ProviderKind::Gemini, "unused"));

        let err = service(&groq, &gemini, false)
            .generate_content("hello", &GenerateOptions::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Groq does not support"));
        assert_eq!(gemini.calls(), 0);
    }

    #[test]
    fn test_into_result() {
        let ok: ServiceResult<u8> = ServiceResult::ok(7, ProviderKind::Groq);
        assert_eq!(ok.into_result(), Ok(7));

        let failed: ServiceResult<u8> = ServiceResult::failed("nope".to_string(), ProviderKind::Groq);
        assert_eq!(failed.into_result(), Err("nope".to_string()));
    }

    #[test]
    fn test_service_result_serializes_camel_case() {
        let result: ServiceResult<Value> = ServiceResult::failed("x".to_string(), ProviderKind::Groq);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["providerUsed"], "groq");
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
    }
}
