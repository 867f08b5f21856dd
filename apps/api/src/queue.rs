//! Analysis trigger queue and the worker that drains it.
//!
//! Events are JSON-encoded `AnalysisEvent`s on a Redis list: producers
//! `LPUSH`, the worker `BRPOP`s. Delivery is at-most-once: a popped event is
//! gone whether or not its pipeline run succeeds.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::reports::models::AnalysisEvent;
use crate::reports::pipeline::ReportPipeline;

pub const ANALYSIS_QUEUE_KEY: &str = "interview:analysis:events";

/// Seconds a single BRPOP blocks before polling again.
const POP_TIMEOUT_SECS: u64 = 5;
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Producer side, used by the trigger endpoint.
#[async_trait]
pub trait AnalysisQueue: Send + Sync {
    async fn enqueue(&self, event: &AnalysisEvent) -> Result<(), QueueError>;
}

/// Consumer side. `Ok(None)` means the source is closed and the worker
/// should stop.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> Result<Option<AnalysisEvent>, QueueError>;
}

#[derive(Clone)]
pub struct RedisQueue {
    client: redis::Client,
    conn: ConnectionManager,
    key: String,
}

impl RedisQueue {
    pub async fn connect(client: redis::Client) -> Result<Self, QueueError> {
        let mut conn = ConnectionManager::new(client.clone()).await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!("Redis connection established");
        Ok(Self {
            client,
            conn,
            key: ANALYSIS_QUEUE_KEY.to_string(),
        })
    }

    /// Opens a dedicated connection for the worker so blocking pops never
    /// stall producers.
    pub async fn consumer(&self) -> Result<RedisEventSource, QueueError> {
        let conn = ConnectionManager::new(self.client.clone()).await?;
        Ok(RedisEventSource {
            conn,
            key: self.key.clone(),
        })
    }
}

#[async_trait]
impl AnalysisQueue for RedisQueue {
    async fn enqueue(&self, event: &AnalysisEvent) -> Result<(), QueueError> {
        let payload = serde_json::to_string(event)?;
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("LPUSH")
            .arg(&self.key)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}

pub struct RedisEventSource {
    conn: ConnectionManager,
    key: String,
}

#[async_trait]
impl EventSource for RedisEventSource {
    async fn next_event(&mut self) -> Result<Option<AnalysisEvent>, QueueError> {
        loop {
            let popped: Option<(String, String)> = redis::cmd("BRPOP")
                .arg(&self.key)
                .arg(POP_TIMEOUT_SECS)
                .query_async(&mut self.conn)
                .await?;

            let Some((_, payload)) = popped else {
                continue;
            };

            match serde_json::from_str::<AnalysisEvent>(&payload) {
                Ok(event) => return Ok(Some(event)),
                Err(e) => warn!("Dropping malformed analysis event: {e}"),
            }
        }
    }
}

/// Drains `source`, running at most `max_parallel` pipeline runs at a time.
/// Returns once the source closes and every in-flight run has finished.
pub async fn run_worker<S: EventSource>(
    mut source: S,
    pipeline: Arc<ReportPipeline>,
    max_parallel: usize,
) {
    let max_parallel = max_parallel.max(1);
    let semaphore = Arc::new(Semaphore::new(max_parallel));
    info!("Analysis worker started ({max_parallel} parallel runs)");

    loop {
        let event = match source.next_event().await {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read analysis event: {e}");
                tokio::time::sleep(ERROR_BACKOFF).await;
                continue;
            }
        };

        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            let _permit = permit;
            info!(
                "Running analysis for candidate {} / interview {}",
                event.candidate_id, event.interview_id
            );
            if let Err(e) = pipeline.run(&event).await {
                error!(
                    "Analysis failed for candidate {} / interview {}: {e}",
                    event.candidate_id, event.interview_id
                );
            }
        });
    }

    // Wait for in-flight runs.
    let _ = semaphore.acquire_many(max_parallel as u32).await;
    info!("Analysis worker stopped");
}
