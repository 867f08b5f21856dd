//! Persistence seams for the report pipeline and the read paths.
//!
//! Ids are UUID columns in Postgres and strings in the domain: inputs are
//! cast with `$n::uuid`, outputs are selected back as `::text`.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::candidate::CandidateRow;
use crate::models::interview::InterviewRow;
use crate::models::result::{FeedbackAnalysisRow, InterviewResultRow};

pub const STATUS_COMPLETED: &str = "Completed";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Values for a new `interview_results` row. The id and timestamp are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewInterviewResult {
    pub candidate_id: String,
    pub interview_id: String,
    pub transcript: Option<Value>,
    pub report: Value,
    pub communication_score: i32,
    pub skills_score: i32,
    pub knowledge_score: i32,
    pub summary: Option<String>,
}

#[async_trait]
pub trait CandidateStore: Send + Sync {
    async fn get_candidate(&self, id: &str) -> Result<Option<CandidateRow>, StoreError>;

    async fn set_candidate_status(&self, id: &str, status: &str) -> Result<(), StoreError>;

    /// Per-interview status in `candidate_interviews`. Zero matching rows is
    /// not an error.
    async fn set_candidate_interview_status(
        &self,
        candidate_id: &str,
        interview_id: &str,
        status: &str,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn get_interview(&self, id: &str) -> Result<Option<InterviewRow>, StoreError>;
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn insert_result(&self, result: NewInterviewResult) -> Result<Uuid, StoreError>;

    async fn get_result(&self, id: Uuid) -> Result<Option<InterviewResultRow>, StoreError>;

    async fn insert_feedback_analysis(
        &self,
        candidate_id: &str,
        analysis: &Value,
    ) -> Result<Uuid, StoreError>;

    /// Newest first.
    async fn results_for_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<Vec<InterviewResultRow>, StoreError>;

    /// Newest first.
    async fn analyses_for_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<Vec<FeedbackAnalysisRow>, StoreError>;

    /// Result rows whose candidate never reached `Completed`: the window left
    /// by a failed candidate-status update.
    async fn orphaned_results(&self) -> Result<Vec<InterviewResultRow>, StoreError>;
}

const RESULT_COLUMNS: &str = "r.id, r.candidate_id::text AS candidate_id, \
    r.interview_id::text AS interview_id, r.transcript, r.report, \
    r.communication_score, r.skills_score, r.knowledge_score, r.summary, r.created_at";

/// PostgreSQL implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CandidateStore for PgStore {
    async fn get_candidate(&self, id: &str) -> Result<Option<CandidateRow>, StoreError> {
        Ok(sqlx::query_as::<_, CandidateRow>(
            "SELECT id::text AS id, name, email, resume_text, interview_status \
             FROM candidates WHERE id = $1::uuid",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_candidate_status(&self, id: &str, status: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE candidates SET interview_status = $1, updated_at = $2 WHERE id = $3::uuid")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_candidate_interview_status(
        &self,
        candidate_id: &str,
        interview_id: &str,
        status: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE candidate_interviews
            SET interview_status = $1, updated_at = $2
            WHERE candidate_id = $3::uuid AND interview_id = $4::uuid
            "#,
        )
        .bind(status)
        .bind(Utc::now())
        .bind(candidate_id)
        .bind(interview_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl InterviewStore for PgStore {
    async fn get_interview(&self, id: &str) -> Result<Option<InterviewRow>, StoreError> {
        Ok(sqlx::query_as::<_, InterviewRow>(
            "SELECT id::text AS id, title, jd_name, jd_text, interview_type, duration \
             FROM interviews WHERE id = $1::uuid",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }
}

#[async_trait]
impl ResultStore for PgStore {
    async fn insert_result(&self, result: NewInterviewResult) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO interview_results
                (id, candidate_id, interview_id, transcript, report,
                 communication_score, skills_score, knowledge_score, summary, created_at)
            VALUES ($1, $2::uuid, $3::uuid, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&result.candidate_id)
        .bind(&result.interview_id)
        .bind(&result.transcript)
        .bind(&result.report)
        .bind(result.communication_score)
        .bind(result.skills_score)
        .bind(result.knowledge_score)
        .bind(&result.summary)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn get_result(&self, id: Uuid) -> Result<Option<InterviewResultRow>, StoreError> {
        let sql = format!("SELECT {RESULT_COLUMNS} FROM interview_results r WHERE r.id = $1");
        Ok(sqlx::query_as::<_, InterviewResultRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_feedback_analysis(
        &self,
        candidate_id: &str,
        analysis: &Value,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO feedback_analysis (id, candidate_id, analysis, created_at) \
             VALUES ($1, $2::uuid, $3, $4)",
        )
        .bind(id)
        .bind(candidate_id)
        .bind(analysis)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn results_for_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<Vec<InterviewResultRow>, StoreError> {
        let sql = format!(
            "SELECT {RESULT_COLUMNS} FROM interview_results r \
             WHERE r.candidate_id = $1::uuid ORDER BY r.created_at DESC"
        );
        Ok(sqlx::query_as::<_, InterviewResultRow>(&sql)
            .bind(candidate_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn analyses_for_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<Vec<FeedbackAnalysisRow>, StoreError> {
        Ok(sqlx::query_as::<_, FeedbackAnalysisRow>(
            "SELECT id, candidate_id::text AS candidate_id, analysis, created_at \
             FROM feedback_analysis WHERE candidate_id = $1::uuid ORDER BY created_at DESC",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn orphaned_results(&self) -> Result<Vec<InterviewResultRow>, StoreError> {
        let sql = format!(
            "SELECT {RESULT_COLUMNS} FROM interview_results r \
             JOIN candidates c ON c.id = r.candidate_id \
             WHERE c.interview_status IS DISTINCT FROM $1 \
             ORDER BY r.created_at DESC"
        );
        Ok(sqlx::query_as::<_, InterviewResultRow>(&sql)
            .bind(STATUS_COMPLETED)
            .fetch_all(&self.pool)
            .await?)
    }
}
