use std::sync::Arc;

use crate::ai::GenerationService;
use crate::queue::AnalysisQueue;
use crate::reports::store::ResultStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single generation entry point, shared with the analysis worker.
    pub ai: Arc<GenerationService>,
    pub results: Arc<dyn ResultStore>,
    pub queue: Arc<dyn AnalysisQueue>,
}
