//! In-memory store used by pipeline, queue and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::models::candidate::CandidateRow;
use crate::models::interview::InterviewRow;
use crate::models::result::{FeedbackAnalysisRow, InterviewResultRow};
use crate::reports::store::{
    CandidateStore, InterviewStore, NewInterviewResult, ResultStore, StoreError,
};

/// A well-formed model reply for the final report.
pub const SAMPLE_REPORT_JSON: &str = r#"{
    "strengths": ["Walked through a lock-free queue design with clear tradeoffs"],
    "weaknesses": ["Hand-waved the failure modes of the retry loop"],
    "hiringRecommendation": "Hire",
    "riskFlags": [],
    "finalScore": 76,
    "communicationScore": 81.4,
    "skillsScore": "72",
    "knowledgeScore": 74,
    "summary": "Strong systems fundamentals with some gaps in failure handling.",
    "communication_coaching": {"verbal_delivery": ["Pause before answering"], "structuring_answers": []},
    "resume_vs_reality": {"verified_claims": ["Postgres tuning"], "exaggerated_claims": [], "missing_skills": []},
    "strategic_recommendations": {"resume_edits": [], "study_focus": ["Backpressure"]}
}"#;

/// Operations that can be switched to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    GetCandidate,
    GetInterview,
    InsertResult,
    SetCandidateStatus,
    SetInterviewStatus,
    GetResult,
    InsertAnalysis,
}

#[derive(Default)]
pub struct MemoryStore {
    candidates: Mutex<HashMap<String, CandidateRow>>,
    interviews: Mutex<HashMap<String, InterviewRow>>,
    interview_status: Mutex<HashMap<(String, String), String>>,
    results: Mutex<Vec<InterviewResultRow>>,
    analyses: Mutex<Vec<FeedbackAnalysisRow>>,
    failing: Mutex<Vec<StoreOp>>,
    calls: Mutex<Vec<StoreOp>>,
    lose_results: AtomicBool,
}

fn injected(op: StoreOp) -> StoreError {
    StoreError::Database(sqlx::Error::Protocol(format!("injected failure: {op:?}")))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds candidate `candidate_id` (with a resume) and interview `interview_id`.
    pub fn seeded(candidate_id: &str, interview_id: &str) -> Self {
        let store = Self::new();
        store.add_candidate(CandidateRow {
            id: candidate_id.to_string(),
            name: Some("Ada Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            resume_text: Some("Systems engineer, 6 years of Rust and Postgres.".to_string()),
            interview_status: Some("Scheduled".to_string()),
        });
        store.add_interview(InterviewRow {
            id: interview_id.to_string(),
            title: "Backend Engineer".to_string(),
            jd_name: Some("Backend JD".to_string()),
            jd_text: Some("Design and operate async Rust services.".to_string()),
            interview_type: Some("Technical".to_string()),
            duration: Some(30),
        });
        store
            .interview_status
            .lock()
            .unwrap()
            .insert((candidate_id.to_string(), interview_id.to_string()), "Scheduled".to_string());
        store
    }

    pub fn add_candidate(&self, candidate: CandidateRow) {
        self.candidates
            .lock()
            .unwrap()
            .insert(candidate.id.clone(), candidate);
    }

    pub fn add_interview(&self, interview: InterviewRow) {
        self.interviews
            .lock()
            .unwrap()
            .insert(interview.id.clone(), interview);
    }

    pub fn fail_on(&self, op: StoreOp) -> &Self {
        self.failing.lock().unwrap().push(op);
        self
    }

    /// Makes `get_result` miss every row, as if the insert was never visible.
    pub fn lose_results(&self) -> &Self {
        self.lose_results.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<StoreOp> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, op: StoreOp) -> bool {
        self.calls().contains(&op)
    }

    pub fn results(&self) -> Vec<InterviewResultRow> {
        self.results.lock().unwrap().clone()
    }

    pub fn analyses(&self) -> Vec<FeedbackAnalysisRow> {
        self.analyses.lock().unwrap().clone()
    }

    pub fn candidate_status(&self, id: &str) -> Option<String> {
        self.candidates
            .lock()
            .unwrap()
            .get(id)
            .and_then(|c| c.interview_status.clone())
    }

    pub fn interview_status(&self, candidate_id: &str, interview_id: &str) -> Option<String> {
        self.interview_status
            .lock()
            .unwrap()
            .get(&(candidate_id.to_string(), interview_id.to_string()))
            .cloned()
    }

    fn enter(&self, op: StoreOp) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(op);
        if self.failing.lock().unwrap().contains(&op) {
            return Err(injected(op));
        }
        Ok(())
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    async fn get_candidate(&self, id: &str) -> Result<Option<CandidateRow>, StoreError> {
        self.enter(StoreOp::GetCandidate)?;
        Ok(self.candidates.lock().unwrap().get(id).cloned())
    }

    async fn set_candidate_status(&self, id: &str, status: &str) -> Result<(), StoreError> {
        self.enter(StoreOp::SetCandidateStatus)?;
        if let Some(candidate) = self.candidates.lock().unwrap().get_mut(id) {
            candidate.interview_status = Some(status.to_string());
        }
        Ok(())
    }

    async fn set_candidate_interview_status(
        &self,
        candidate_id: &str,
        interview_id: &str,
        status: &str,
    ) -> Result<(), StoreError> {
        self.enter(StoreOp::SetInterviewStatus)?;
        let key = (candidate_id.to_string(), interview_id.to_string());
        if let Some(current) = self.interview_status.lock().unwrap().get_mut(&key) {
            *current = status.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl InterviewStore for MemoryStore {
    async fn get_interview(&self, id: &str) -> Result<Option<InterviewRow>, StoreError> {
        self.enter(StoreOp::GetInterview)?;
        Ok(self.interviews.lock().unwrap().get(id).cloned())
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn insert_result(&self, result: NewInterviewResult) -> Result<Uuid, StoreError> {
        self.enter(StoreOp::InsertResult)?;
        let mut results = self.results.lock().unwrap();
        let id = Uuid::new_v4();
        // Strictly increasing timestamps keep "newest first" deterministic.
        let created_at = Utc::now() + Duration::milliseconds(results.len() as i64);
        results.push(InterviewResultRow {
            id,
            candidate_id: result.candidate_id,
            interview_id: result.interview_id,
            transcript: result.transcript,
            report: result.report,
            communication_score: result.communication_score,
            skills_score: result.skills_score,
            knowledge_score: result.knowledge_score,
            summary: result.summary,
            created_at,
        });
        Ok(id)
    }

    async fn get_result(&self, id: Uuid) -> Result<Option<InterviewResultRow>, StoreError> {
        self.enter(StoreOp::GetResult)?;
        if self.lose_results.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self
            .results
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn insert_feedback_analysis(
        &self,
        candidate_id: &str,
        analysis: &Value,
    ) -> Result<Uuid, StoreError> {
        self.enter(StoreOp::InsertAnalysis)?;
        let mut analyses = self.analyses.lock().unwrap();
        let id = Uuid::new_v4();
        let created_at = Utc::now() + Duration::milliseconds(analyses.len() as i64);
        analyses.push(FeedbackAnalysisRow {
            id,
            candidate_id: candidate_id.to_string(),
            analysis: analysis.clone(),
            created_at,
        });
        Ok(id)
    }

    async fn results_for_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<Vec<InterviewResultRow>, StoreError> {
        let mut rows: Vec<_> = self
            .results()
            .into_iter()
            .filter(|r| r.candidate_id == candidate_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn analyses_for_candidate(
        &self,
        candidate_id: &str,
    ) -> Result<Vec<FeedbackAnalysisRow>, StoreError> {
        let mut rows: Vec<_> = self
            .analyses()
            .into_iter()
            .filter(|a| a.candidate_id == candidate_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn orphaned_results(&self) -> Result<Vec<InterviewResultRow>, StoreError> {
        let candidates = self.candidates.lock().unwrap().clone();
        let mut rows: Vec<_> = self
            .results()
            .into_iter()
            .filter(|r| {
                candidates.get(&r.candidate_id).is_some_and(|c| {
                    c.interview_status.as_deref()
                        != Some(crate::reports::store::STATUS_COMPLETED)
                })
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
