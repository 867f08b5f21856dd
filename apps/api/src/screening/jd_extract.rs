//! JD extraction: structured job description fields from pasted text or an
//! uploaded file.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ai::prompts::{fill_template, truncate_chars, JSON_ONLY_FOOTER};
use crate::ai::{
    null_as_default, CapabilityError, GenerateOptions, GenerationService, InlineBinary,
    ServiceResult, StructuredOutput,
};
use crate::screening::prompts::{
    JD_EXTRACT_SCHEMA, JD_EXTRACT_SYSTEM, JD_FILE_PROMPT_TEMPLATE, JD_TEXT_BUDGET,
    JD_TEXT_PROMPT_TEMPLATE,
};

fn non_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Accepts a number or a string; normalizes to a string. 0, "" and null
/// read as absent.
fn duration_as_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JdExtraction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub jd_name: String,
    #[serde(default, deserialize_with = "non_blank")]
    pub interview_type: Option<String>,
    #[serde(default, deserialize_with = "duration_as_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
}

impl StructuredOutput for JdExtraction {
    fn validate(mut self) -> Result<Self, String> {
        self.skills.retain(|s| !s.trim().is_empty());
        if self.title.trim().is_empty() && self.summary.trim().is_empty() && self.skills.is_empty()
        {
            return Err("JD extraction returned no title, summary or skills".to_string());
        }
        Ok(self)
    }
}

/// Prompt for pasted or plain-text JD content. Pure.
pub fn build_jd_text_prompt(jd_text: &str) -> String {
    let prompt = fill_template(
        JD_TEXT_PROMPT_TEMPLATE,
        &[
            ("schema", JD_EXTRACT_SCHEMA),
            ("jd_text", truncate_chars(jd_text, JD_TEXT_BUDGET)),
        ],
    );
    format!("{prompt}\n\n{JSON_ONLY_FOOTER}")
}

/// Prompt for a JD attached as inline binary. Pure.
pub fn build_jd_file_prompt() -> String {
    let prompt = JD_FILE_PROMPT_TEMPLATE.replace("{schema}", JD_EXTRACT_SCHEMA);
    format!("{prompt}\n\n{JSON_ONLY_FOOTER}")
}

pub async fn extract_jd_from_text(
    ai: &GenerationService,
    jd_text: &str,
) -> Result<ServiceResult<JdExtraction>, CapabilityError> {
    let options = GenerateOptions::json().with_system_prompt(JD_EXTRACT_SYSTEM);
    ai.generate_json::<JdExtraction>(&build_jd_text_prompt(jd_text), &options)
        .await
}

/// Sends the file itself to a provider that accepts binary input.
pub async fn extract_jd_from_file(
    ai: &GenerationService,
    file: InlineBinary,
) -> Result<ServiceResult<JdExtraction>, CapabilityError> {
    let options = GenerateOptions::json()
        .with_system_prompt(JD_EXTRACT_SYSTEM)
        .with_inline_binary(file);
    ai.generate_json::<JdExtraction>(&build_jd_file_prompt(), &options)
        .await
}
