//! Shared HTTP plumbing for provider adapters: client construction and the
//! retrying POST used by every adapter.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::warn;

use crate::ai::{ProviderError, ProviderKind};

/// Transport timeout for a single provider call. The only timeout in the
/// generation path.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub(crate) const MAX_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub(crate) fn build_client() -> Result<Client, ProviderError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Exponential backoff: 1s, 2s, 4s, ...
pub(crate) fn retry_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << attempt.saturating_sub(1).min(6)))
}

/// Extracts `error.message` from a provider error body, falling back to the
/// raw body. Groq and Gemini share this envelope shape.
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Sends the request built by `build`, returning the raw success body.
/// Retries on 429, 5xx and connection errors with exponential backoff.
/// Timeouts and other statuses fail immediately.
pub(crate) async fn send_with_retry<F>(provider: ProviderKind, build: F) -> Result<String, ProviderError>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<ProviderError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            let delay = retry_delay(attempt);
            warn!(
                "{} call attempt {} failed, retrying after {}ms...",
                provider,
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Err(ProviderError::Http(e)),
            Err(e) => {
                last_error = Some(ProviderError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            warn!("{} rate limited: {}", provider, body);
            last_error = Some(ProviderError::RateLimited {
                retries: attempt + 1,
            });
            continue;
        }

        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} API returned {}: {}", provider, status, body);
            last_error = Some(ProviderError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        return Ok(response.text().await?);
    }

    Err(last_error.unwrap_or(ProviderError::RateLimited {
        retries: MAX_RETRIES,
    }))
}
