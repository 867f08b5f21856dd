pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ai::{ProviderKind, ServiceResult};
use crate::errors::AppError;
use crate::reports::handlers as reports;
use crate::screening::handlers as screening;
use crate::state::AppState;

/// Upload cap for resume and JD files.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Unwraps a generation result for a handler: data plus the provider that
/// produced it, or a `Generation` error carrying the failover message.
pub fn generated<T>(result: ServiceResult<T>) -> Result<(T, ProviderKind), AppError> {
    let provider = result.provider_used;
    result
        .into_result()
        .map(|data| (data, provider))
        .map_err(AppError::Generation)
}

async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening
        .route(
            "/api/v1/resumes/score",
            post(screening::handle_score_resume),
        )
        .route("/api/v1/jd/parse", post(screening::handle_parse_jd))
        // Reports
        .route(
            "/api/v1/feedback/analyze",
            post(reports::handle_analyze_feedback),
        )
        .route(
            "/api/v1/interviews/completed",
            post(reports::handle_interview_completed),
        )
        .route(
            "/api/v1/candidates/:id/results",
            get(reports::handle_candidate_results),
        )
        .route(
            "/api/v1/reconciliation/orphaned-results",
            get(reports::handle_orphaned_results),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
