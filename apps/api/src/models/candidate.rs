use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Read-only view of a candidate used by the report pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub resume_text: Option<String>,
    pub interview_status: Option<String>,
}
