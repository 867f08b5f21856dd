use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One row of `interview_results`. Append-only: a correction is a new row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewResultRow {
    pub id: Uuid,
    pub candidate_id: String,
    pub interview_id: String,
    pub transcript: Option<Value>,
    pub report: Value,
    pub communication_score: i32,
    pub skills_score: i32,
    pub knowledge_score: i32,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Denormalized copy of a report in `feedback_analysis`, keyed by candidate only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeedbackAnalysisRow {
    pub id: Uuid,
    pub candidate_id: String,
    pub analysis: Value,
    pub created_at: DateTime<Utc>,
}
