use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::ai::ProviderKind;
use crate::errors::AppError;
use crate::models::result::{FeedbackAnalysisRow, InterviewResultRow};
use crate::reports::feedback::{synthesize_feedback, FeedbackSynthesis};
use crate::reports::models::AnalysisEvent;
use crate::routes::generated;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default)]
    pub resume_data: Value,
    #[serde(default)]
    pub feedback_data: Value,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub analysis: FeedbackSynthesis,
    pub provider: ProviderKind,
}

/// POST /api/v1/feedback/analyze
pub async fn handle_analyze_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    if req.resume_data.is_null() && req.feedback_data.is_null() {
        return Err(AppError::Validation(
            "resumeData or feedbackData is required".to_string(),
        ));
    }

    let result = synthesize_feedback(&state.ai, &req.resume_data, &req.feedback_data).await?;
    let (analysis, provider) = generated(result)?;
    Ok(Json(FeedbackResponse { analysis, provider }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueuedResponse {
    pub queued: bool,
    pub candidate_id: String,
    pub interview_id: String,
}

/// POST /api/v1/interviews/completed
///
/// Accepts the call source's end-of-session event and hands it to the
/// analysis worker.
pub async fn handle_interview_completed(
    State(state): State<AppState>,
    Json(event): Json<AnalysisEvent>,
) -> Result<(StatusCode, Json<EnqueuedResponse>), AppError> {
    if event.candidate_id.trim().is_empty() || event.interview_id.trim().is_empty() {
        return Err(AppError::Validation(
            "candidateId and interviewId are required".to_string(),
        ));
    }

    state.queue.enqueue(&event).await?;
    info!(
        "Queued analysis for candidate {} / interview {} ({} turns)",
        event.candidate_id,
        event.interview_id,
        event.conversation.as_ref().map_or(0, Vec::len)
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueuedResponse {
            queued: true,
            candidate_id: event.candidate_id,
            interview_id: event.interview_id,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct CandidateResultsResponse {
    pub results: Vec<InterviewResultRow>,
    pub analyses: Vec<FeedbackAnalysisRow>,
}

/// GET /api/v1/candidates/:id/results
pub async fn handle_candidate_results(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> Result<Json<CandidateResultsResponse>, AppError> {
    let (results, analyses) = tokio::try_join!(
        state.results.results_for_candidate(&candidate_id),
        state.results.analyses_for_candidate(&candidate_id),
    )?;
    Ok(Json(CandidateResultsResponse { results, analyses }))
}

#[derive(Debug, Serialize)]
pub struct OrphanedResultsResponse {
    pub count: usize,
    pub results: Vec<InterviewResultRow>,
}

/// GET /api/v1/reconciliation/orphaned-results
pub async fn handle_orphaned_results(
    State(state): State<AppState>,
) -> Result<Json<OrphanedResultsResponse>, AppError> {
    let results = state.results.orphaned_results().await?;
    Ok(Json(OrphanedResultsResponse {
        count: results.len(),
        results,
    }))
}
