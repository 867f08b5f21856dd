//! Report data models: the canonical evaluation report, the transcript it is
//! built from, and the trigger event.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::ai::{null_as_default, ProviderKind, StructuredOutput};
use crate::models::score::deserialize_score;

/// Transcripts shorter than this carry no signal worth a model call.
pub const MIN_TRANSCRIPT_TURNS: usize = 3;
pub const EARLY_EXIT_RISK_FLAG: &str = "Early Exit / Incomplete";
pub const EARLY_EXIT_SUMMARY: &str =
    "Exited in middle of interview (No conversation data available).";

// ────────────────────────────────────────────────────────────────────────────
// Transcript & trigger event
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    #[serde(alias = "agent", alias = "bot")]
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

/// Payload emitted by the call source when an interview session ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEvent {
    pub candidate_id: String,
    pub interview_id: String,
    #[serde(default)]
    pub conversation: Option<Vec<TranscriptTurn>>,
}

/// Absent or fewer than `MIN_TRANSCRIPT_TURNS` turns.
pub fn is_early_exit(conversation: Option<&[TranscriptTurn]>) -> bool {
    conversation.map_or(true, |turns| turns.len() < MIN_TRANSCRIPT_TURNS)
}

// ────────────────────────────────────────────────────────────────────────────
// Report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HiringRecommendation {
    #[serde(rename = "Strong Hire")]
    StrongHire,
    #[serde(rename = "Hire")]
    Hire,
    #[serde(rename = "Weak Hire")]
    WeakHire,
    #[serde(rename = "No Hire")]
    NoHire,
}

impl HiringRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            HiringRecommendation::StrongHire => "Strong Hire",
            HiringRecommendation::Hire => "Hire",
            HiringRecommendation::WeakHire => "Weak Hire",
            HiringRecommendation::NoHire => "No Hire",
        }
    }
}

impl fmt::Display for HiringRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HiringRecommendation {
    type Err = String;

    /// Case-insensitive; spaces, underscores and hyphens are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "stronghire" => Ok(HiringRecommendation::StrongHire),
            "hire" => Ok(HiringRecommendation::Hire),
            "weakhire" => Ok(HiringRecommendation::WeakHire),
            "nohire" => Ok(HiringRecommendation::NoHire),
            _ => Err(format!("unknown hiring recommendation '{s}'")),
        }
    }
}

impl<'de> Deserialize<'de> for HiringRecommendation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunicationCoaching {
    #[serde(default, deserialize_with = "null_as_default")]
    pub verbal_delivery: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub structuring_answers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeVsReality {
    #[serde(default, deserialize_with = "null_as_default")]
    pub verified_claims: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub exaggerated_claims: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategicRecommendations {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resume_edits: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub study_focus: Vec<String>,
}

/// The canonical evaluation report. Scores are clamped to 0–100 on parse;
/// every list and the summary read missing or `null` as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(deserialize_with = "deserialize_score")]
    pub final_score: u8,
    #[serde(deserialize_with = "deserialize_score")]
    pub communication_score: u8,
    #[serde(deserialize_with = "deserialize_score")]
    pub skills_score: u8,
    #[serde(deserialize_with = "deserialize_score")]
    pub knowledge_score: u8,
    pub hiring_recommendation: HiringRecommendation,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risk_flags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(
        rename = "communication_coaching",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub communication_coaching: Option<CommunicationCoaching>,
    #[serde(
        rename = "resume_vs_reality",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resume_vs_reality: Option<ResumeVsReality>,
    #[serde(
        rename = "strategic_recommendations",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub strategic_recommendations: Option<StrategicRecommendations>,
}

impl Report {
    /// Zero-score "No Hire" report for an abandoned interview. Fully formed,
    /// so downstream readers never special-case a missing report.
    pub fn early_exit() -> Self {
        Self {
            final_score: 0,
            communication_score: 0,
            skills_score: 0,
            knowledge_score: 0,
            hiring_recommendation: HiringRecommendation::NoHire,
            strengths: vec![],
            weaknesses: vec![],
            risk_flags: vec![EARLY_EXIT_RISK_FLAG.to_string()],
            summary: EARLY_EXIT_SUMMARY.to_string(),
            communication_coaching: Some(CommunicationCoaching::default()),
            resume_vs_reality: Some(ResumeVsReality::default()),
            strategic_recommendations: Some(StrategicRecommendations::default()),
        }
    }
}

fn drop_blank(items: &mut Vec<String>) {
    items.retain(|item| !item.trim().is_empty());
}

impl StructuredOutput for Report {
    fn validate(mut self) -> Result<Self, String> {
        drop_blank(&mut self.strengths);
        drop_blank(&mut self.weaknesses);
        drop_blank(&mut self.risk_flags);
        self.summary = self.summary.trim().to_string();
        if let Some(coaching) = self.communication_coaching.as_mut() {
            drop_blank(&mut coaching.verbal_delivery);
            drop_blank(&mut coaching.structuring_answers);
        }
        if let Some(rvr) = self.resume_vs_reality.as_mut() {
            drop_blank(&mut rvr.verified_claims);
            drop_blank(&mut rvr.exaggerated_claims);
            drop_blank(&mut rvr.missing_skills);
        }
        if let Some(recs) = self.strategic_recommendations.as_mut() {
            drop_blank(&mut recs.resume_edits);
            drop_blank(&mut recs.study_focus);
        }
        Ok(self)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluated report (tagged union)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    EarlyExit,
    FullAnalysis,
}

/// A report together with how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluatedReport {
    EarlyExit(Report),
    FullAnalysis {
        report: Report,
        provider_used: ProviderKind,
    },
}

impl EvaluatedReport {
    pub fn kind(&self) -> ReportKind {
        match self {
            EvaluatedReport::EarlyExit(_) => ReportKind::EarlyExit,
            EvaluatedReport::FullAnalysis { .. } => ReportKind::FullAnalysis,
        }
    }

    pub fn report(&self) -> &Report {
        match self {
            EvaluatedReport::EarlyExit(report) => report,
            EvaluatedReport::FullAnalysis { report, .. } => report,
        }
    }

    pub fn provider_used(&self) -> Option<ProviderKind> {
        match self {
            EvaluatedReport::EarlyExit(_) => None,
            EvaluatedReport::FullAnalysis { provider_used, .. } => Some(*provider_used),
        }
    }
}
