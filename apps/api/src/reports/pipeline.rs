//! Report Pipeline: turns a completed-interview event into a persisted report.
//!
//! Flow: load candidate + interview → early exit or full analysis → saga.
//!
//! The saga is best-effort and not transactional:
//!   1. insert the result row            (fatal)
//!   2. mark the candidate Completed     (fatal, the result row stays)
//!   3. mark candidate_interviews        (degraded)
//!   4. copy the report to feedback_analysis, re-read by result id (degraded)
//!
//! Rows left behind by a failure in step 2 are listed by
//! `ResultStore::orphaned_results`.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::ai::{CapabilityError, GenerationService, ProviderKind};
use crate::models::candidate::CandidateRow;
use crate::models::interview::InterviewRow;
use crate::reports::final_report::generate_final_report;
use crate::reports::models::{
    is_early_exit, AnalysisEvent, EvaluatedReport, Report, ReportKind, TranscriptTurn,
};
use crate::reports::store::{
    CandidateStore, InterviewStore, NewInterviewResult, ResultStore, StoreError, STATUS_COMPLETED,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Failed to load {entity}: {source}")]
    Lookup {
        entity: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Failed to generate report: {0}")]
    Generation(String),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("Failed to insert interview result: {0}")]
    ResultInsert(#[source] StoreError),

    #[error("Failed to update candidate status (result {result_id} persisted): {source}")]
    CandidateStatus {
        result_id: Uuid,
        #[source]
        source: StoreError,
    },
}

/// A non-fatal saga step that did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedStep {
    InterviewStatus,
    AnalysisCopy,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub result_id: Uuid,
    pub kind: ReportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_used: Option<ProviderKind>,
    pub degraded: Vec<DegradedStep>,
}

impl PipelineOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

pub struct ReportPipeline {
    ai: Arc<GenerationService>,
    candidates: Arc<dyn CandidateStore>,
    interviews: Arc<dyn InterviewStore>,
    results: Arc<dyn ResultStore>,
}

impl ReportPipeline {
    pub fn new(
        ai: Arc<GenerationService>,
        candidates: Arc<dyn CandidateStore>,
        interviews: Arc<dyn InterviewStore>,
        results: Arc<dyn ResultStore>,
    ) -> Self {
        Self {
            ai,
            candidates,
            interviews,
            results,
        }
    }

    /// Runs one event end to end. Not idempotent: the same event twice
    /// produces two result rows.
    pub async fn run(&self, event: &AnalysisEvent) -> Result<PipelineOutcome, PipelineError> {
        let (candidate, interview) = self.load(event).await?;
        let conversation = event.conversation.as_deref();

        let evaluated = self.evaluate(&candidate, &interview, conversation).await?;
        let outcome = self.persist(event, &evaluated).await?;

        if outcome.is_degraded() {
            warn!(
                "Report {} for candidate {} persisted with degraded steps: {:?}",
                outcome.result_id, event.candidate_id, outcome.degraded
            );
        } else {
            info!(
                "Report {} for candidate {} persisted ({:?})",
                outcome.result_id, event.candidate_id, outcome.kind
            );
        }
        Ok(outcome)
    }

    async fn load(
        &self,
        event: &AnalysisEvent,
    ) -> Result<(CandidateRow, InterviewRow), PipelineError> {
        let (candidate, interview) = tokio::try_join!(
            async {
                self.candidates
                    .get_candidate(&event.candidate_id)
                    .await
                    .map_err(|source| PipelineError::Lookup {
                        entity: "candidate",
                        source,
                    })
            },
            async {
                self.interviews
                    .get_interview(&event.interview_id)
                    .await
                    .map_err(|source| PipelineError::Lookup {
                        entity: "interview",
                        source,
                    })
            },
        )?;

        let candidate = candidate.ok_or_else(|| PipelineError::NotFound {
            entity: "Candidate",
            id: event.candidate_id.clone(),
        })?;
        let interview = interview.ok_or_else(|| PipelineError::NotFound {
            entity: "Interview",
            id: event.interview_id.clone(),
        })?;
        Ok((candidate, interview))
    }

    /// Early exit is synthesized locally; a full analysis makes exactly one
    /// generation call (plus at most one failover inside the service).
    pub async fn evaluate(
        &self,
        candidate: &CandidateRow,
        interview: &InterviewRow,
        conversation: Option<&[TranscriptTurn]>,
    ) -> Result<EvaluatedReport, PipelineError> {
        if is_early_exit(conversation) {
            info!(
                "Early exit detected for candidate {}. Bypassing generation.",
                candidate.id
            );
            return Ok(EvaluatedReport::EarlyExit(Report::early_exit()));
        }

        let turns = conversation.unwrap_or(&[]);
        let result = generate_final_report(
            &self.ai,
            interview,
            candidate.resume_text.as_deref(),
            turns,
        )
        .await?;

        let provider_used = result.provider_used;
        let report = result.into_result().map_err(PipelineError::Generation)?;
        Ok(EvaluatedReport::FullAnalysis {
            report,
            provider_used,
        })
    }

    async fn persist(
        &self,
        event: &AnalysisEvent,
        evaluated: &EvaluatedReport,
    ) -> Result<PipelineOutcome, PipelineError> {
        let report = evaluated.report();
        let new_result = new_result_row(event, report).map_err(PipelineError::ResultInsert)?;

        let result_id = self
            .results
            .insert_result(new_result)
            .await
            .map_err(PipelineError::ResultInsert)?;

        if let Err(source) = self
            .candidates
            .set_candidate_status(&event.candidate_id, STATUS_COMPLETED)
            .await
        {
            error!(
                "Result {} persisted but candidate {} status update failed: {}",
                result_id, event.candidate_id, source
            );
            return Err(PipelineError::CandidateStatus { result_id, source });
        }

        let mut degraded = Vec::new();

        if let Err(e) = self
            .candidates
            .set_candidate_interview_status(
                &event.candidate_id,
                &event.interview_id,
                STATUS_COMPLETED,
            )
            .await
        {
            warn!("Failed to update candidate_interviews status: {}", e);
            degraded.push(DegradedStep::InterviewStatus);
        }

        if let Err(e) = self.copy_analysis(result_id).await {
            warn!("Failed to copy report {} to feedback_analysis: {}", result_id, e);
            degraded.push(DegradedStep::AnalysisCopy);
        }

        Ok(PipelineOutcome {
            result_id,
            kind: evaluated.kind(),
            provider_used: evaluated.provider_used(),
            degraded,
        })
    }

    async fn copy_analysis(&self, result_id: Uuid) -> Result<(), String> {
        let row = self
            .results
            .get_result(result_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("result {result_id} not found on re-read"))?;

        self.results
            .insert_feedback_analysis(&row.candidate_id, &row.report)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

fn new_result_row(event: &AnalysisEvent, report: &Report) -> Result<NewInterviewResult, StoreError> {
    let transcript = event
        .conversation
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;

    Ok(NewInterviewResult {
        candidate_id: event.candidate_id.clone(),
        interview_id: event.interview_id.clone(),
        transcript,
        report: serde_json::to_value(report)?,
        communication_score: i32::from(report.communication_score),
        skills_score: i32::from(report.skills_score),
        knowledge_score: i32::from(report.knowledge_score),
        summary: Some(report.summary.clone()),
    })
}
