//! Feedback synthesis: a free-form coaching analysis built from resume data
//! and interviewer feedback, both supplied by the caller as JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::prompts::{fill_template, truncate_chars, JSON_ONLY_FOOTER};
use crate::ai::{
    CapabilityError, GenerateOptions, GenerationService, ServiceResult, StructuredOutput,
};
use crate::reports::prompts::{FEEDBACK_INPUT_BUDGET, FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};

/// Model-shaped analysis. The only structural guarantee is that it is a
/// JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackSynthesis(pub Value);

impl StructuredOutput for FeedbackSynthesis {
    fn validate(self) -> Result<Self, String> {
        match &self.0 {
            Value::Object(map) if !map.is_empty() => Ok(self),
            Value::Object(_) => Err("feedback synthesis is an empty object".to_string()),
            other => Err(format!("feedback synthesis must be a JSON object, got {other}")),
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Assembles the feedback-synthesis prompt. Pure: never calls a provider.
pub fn build_feedback_prompt(resume_data: &Value, feedback_data: &Value) -> String {
    let resume = pretty(resume_data);
    let feedback = pretty(feedback_data);

    let prompt = fill_template(
        FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("resume_data", truncate_chars(&resume, FEEDBACK_INPUT_BUDGET)),
            ("feedback_data", truncate_chars(&feedback, FEEDBACK_INPUT_BUDGET)),
        ],
    );

    format!("{prompt}\n\n{JSON_ONLY_FOOTER}")
}

pub async fn synthesize_feedback(
    ai: &GenerationService,
    resume_data: &Value,
    feedback_data: &Value,
) -> Result<ServiceResult<FeedbackSynthesis>, CapabilityError> {
    let prompt = build_feedback_prompt(resume_data, feedback_data);
    let options = GenerateOptions::json().with_system_prompt(FEEDBACK_SYSTEM);
    ai.generate_json::<FeedbackSynthesis>(&prompt, &options).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::ai::service::decode_structured;
    use crate::ai::testing::ScriptedProvider;
    use crate::ai::ProviderKind;

    #[test]
    fn test_prompt_embeds_both_inputs() {
        let prompt = build_feedback_prompt(
            &json!({"name": "Ada", "skills": ["Rust"]}),
            &json!({"notes": "Great at ownership questions"}),
        );
        assert!(prompt.contains("\"name\": \"Ada\""));
        assert!(prompt.contains("Great at ownership questions"));
        assert!(prompt.contains("RESUME DATA"));
        assert!(prompt.contains("\"performance_metrics\""));
    }

    #[test]
    fn test_prompt_truncates_each_input() {
        let big = json!({ "text": "x".repeat(FEEDBACK_INPUT_BUDGET * 2) });
        let prompt = build_feedback_prompt(&big, &json!({}));
        assert!(!prompt.contains(&"x".repeat(FEEDBACK_INPUT_BUDGET)));
        assert!(prompt.contains(&"x".repeat(FEEDBACK_INPUT_BUDGET - 20)));
    }

    #[test]
    fn test_synthesis_must_be_non_empty_object() {
        assert!(decode_structured::<FeedbackSynthesis>(json!({"summary": "ok"})).is_ok());
        assert!(decode_structured::<FeedbackSynthesis>(json!({})).is_err());
        assert!(decode_structured::<FeedbackSynthesis>(json!(["a"])).is_err());
        assert!(decode_structured::<FeedbackSynthesis>(json!("text")).is_err());
    }

    #[tokio::test]
    async fn test_array_output_fails_over() {
        let groq = Arc::new(ScriptedProvider::ok(ProviderKind::Groq, "[1, 2]"));
        let gemini: Arc<dyn crate::ai::AiProvider> = Arc::new(ScriptedProvider::ok(
            ProviderKind::Gemini,
            r#"{"feedback_analysis": {"summary": "Solid"}}"#,
        ));
        let service = GenerationService::new(groq.clone(), Some(gemini), false);

        let result = synthesize_feedback(&service, &json!({}), &json!({}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.provider_used, ProviderKind::Gemini);
        assert_eq!(result.data.unwrap().0["feedback_analysis"]["summary"], "Solid");
        assert_eq!(groq.calls(), 1);
    }
}
