//! Resume scoring against an optional job description.

use serde::{Deserialize, Deserializer, Serialize};

use crate::ai::prompts::{fill_template, truncate_chars, JSON_ONLY_FOOTER};
use crate::ai::{
    null_as_default, CapabilityError, GenerateOptions, GenerationService, ServiceResult,
    StructuredOutput,
};
use crate::models::score::deserialize_score_or_zero;
use crate::screening::prompts::{
    NO_JD_FALLBACK, RESUME_SCORE_BUDGET, RESUME_SCORE_PROMPT_TEMPLATE, RESUME_SCORE_SYSTEM,
};

pub const DEFAULT_RATING: &str = "Average";

fn default_rating() -> String {
    DEFAULT_RATING.to_string()
}

fn rating_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let rating = Option::<String>::deserialize(deserializer)?;
    Ok(rating
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(default_rating))
}

/// Scorecard for one resume. Missing scores read as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeScore {
    #[serde(default, deserialize_with = "deserialize_score_or_zero")]
    pub skills_match_score: u8,
    #[serde(default, deserialize_with = "deserialize_score_or_zero")]
    pub project_relevance_score: u8,
    #[serde(default, deserialize_with = "deserialize_score_or_zero")]
    pub experience_suitability_score: u8,
    #[serde(default, deserialize_with = "deserialize_score_or_zero")]
    pub overall_score: u8,
    #[serde(default = "default_rating", deserialize_with = "rating_or_default")]
    pub overall_rating: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weaknesses: Vec<String>,
}

impl StructuredOutput for ResumeScore {
    fn validate(mut self) -> Result<Self, String> {
        self.strengths.retain(|s| !s.trim().is_empty());
        self.weaknesses.retain(|s| !s.trim().is_empty());
        Ok(self)
    }
}

/// Assembles the resume scoring prompt. Pure: never calls a provider.
pub fn build_resume_score_prompt(resume_text: &str, jd_text: Option<&str>) -> String {
    let jd = jd_text
        .map(str::trim)
        .filter(|jd| !jd.is_empty())
        .unwrap_or(NO_JD_FALLBACK);

    let prompt = fill_template(
        RESUME_SCORE_PROMPT_TEMPLATE,
        &[
            ("jd_text", jd),
            ("resume_text", truncate_chars(resume_text, RESUME_SCORE_BUDGET)),
        ],
    );

    format!("{prompt}\n\n{JSON_ONLY_FOOTER}")
}

pub async fn score_resume(
    ai: &GenerationService,
    resume_text: &str,
    jd_text: Option<&str>,
) -> Result<ServiceResult<ResumeScore>, CapabilityError> {
    let prompt = build_resume_score_prompt(resume_text, jd_text);
    let options = GenerateOptions::json().with_system_prompt(RESUME_SCORE_SYSTEM);
    ai.generate_json::<ResumeScore>(&prompt, &options).await
}
