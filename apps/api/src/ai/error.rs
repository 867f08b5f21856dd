use thiserror::Error;

use crate::ai::ProviderKind;

/// Failure of a single adapter call. Recovered by `GenerationService`
/// through failover, except for `Capability`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Malformed provider response: {0}")]
    Malformed(String),

    #[error("Provider returned empty content")]
    EmptyContent,

    #[error("Failed to parse JSON response: {0}")]
    Parse(String),

    #[error("{provider} does not support {capability}")]
    Capability {
        provider: ProviderKind,
        capability: &'static str,
    },
}

/// A request a provider structurally cannot serve. Never failed over:
/// it is a caller or configuration bug and surfaces immediately.
#[derive(Debug, Error)]
#[error("Capability error: {0}")]
pub struct CapabilityError(pub String);
