//! Final Report: builds the evaluation prompt from an interview, a resume
//! and a transcript, and runs it through the generation service.

use tracing::info;

use crate::ai::prompts::{fill_template, truncate_chars, JSON_ONLY_FOOTER};
use crate::ai::{CapabilityError, GenerateOptions, GenerationService, ServiceResult};
use crate::models::interview::InterviewRow;
use crate::reports::models::{Report, TranscriptTurn};
use crate::reports::prompts::{
    FINAL_REPORT_PROMPT_TEMPLATE, FINAL_REPORT_SYSTEM, REPORT_RESUME_BUDGET,
    REPORT_TRANSCRIPT_BUDGET, RESUME_TEXT_FALLBACK,
};

/// Serializes the transcript as the JSON array the model sees.
pub fn serialize_transcript(turns: &[TranscriptTurn]) -> String {
    // A Vec of plain structs cannot fail to serialize.
    serde_json::to_string(turns).unwrap_or_else(|_| "[]".to_string())
}

/// Assembles the final-report prompt. Pure: never calls a provider.
pub fn build_final_report_prompt(
    interview: &InterviewRow,
    resume_text: Option<&str>,
    transcript: &str,
) -> String {
    let resume = resume_text
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| truncate_chars(text, REPORT_RESUME_BUDGET))
        .unwrap_or(RESUME_TEXT_FALLBACK);

    let prompt = fill_template(
        FINAL_REPORT_PROMPT_TEMPLATE,
        &[
            ("title", interview.title.as_str()),
            ("job_description", interview.job_description()),
            ("resume_text", resume),
            (
                "transcript",
                truncate_chars(transcript, REPORT_TRANSCRIPT_BUDGET),
            ),
        ],
    );

    format!("{prompt}\n\n{JSON_ONLY_FOOTER}")
}

pub fn final_report_options() -> GenerateOptions {
    GenerateOptions::json().with_system_prompt(FINAL_REPORT_SYSTEM)
}

/// Generates a typed, validated `Report` with provider failover.
pub async fn generate_final_report(
    ai: &GenerationService,
    interview: &InterviewRow,
    resume_text: Option<&str>,
    turns: &[TranscriptTurn],
) -> Result<ServiceResult<Report>, CapabilityError> {
    let prompt = build_final_report_prompt(interview, resume_text, &serialize_transcript(turns));
    info!(
        "Generating final report for interview {} ({} turns)",
        interview.id,
        turns.len()
    );
    ai.generate_json::<Report>(&prompt, &final_report_options()).await
}
