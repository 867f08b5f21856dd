use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: String,
    pub title: String,
    pub jd_name: Option<String>,
    pub jd_text: Option<String>,
    pub interview_type: Option<String>,
    pub duration: Option<i32>,
}

impl InterviewRow {
    /// Job description text for prompts: full text when present, else the JD name.
    pub fn job_description(&self) -> &str {
        self.jd_text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(self.jd_name.as_deref())
            .unwrap_or("")
    }
}
