use std::collections::HashMap;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::ai::{InlineBinary, ProviderKind};
use crate::errors::AppError;
use crate::routes::generated;
use crate::screening::documents::{extract_text, is_plain_text, resolve_mime_type};
use crate::screening::jd_extract::{extract_jd_from_file, extract_jd_from_text, JdExtraction};
use crate::screening::resume_score::{score_resume, ResumeScore};
use crate::state::AppState;

/// A file part from a multipart form.
struct Upload {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl Upload {
    fn mime_type(&self) -> String {
        resolve_mime_type(self.content_type.as_deref(), &self.file_name)
    }
}

/// Collects the `file` part and every text field of a multipart form.
async fn read_form(
    mut multipart: Multipart,
) -> Result<(Option<Upload>, HashMap<String, String>), AppError> {
    let mut upload = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?.to_vec();
            upload = Some(Upload {
                file_name,
                content_type,
                bytes,
            });
        } else {
            fields.insert(name, field.text().await?);
        }
    }
    Ok((upload, fields))
}

fn non_blank(fields: &HashMap<String, String>, key: &str) -> Option<String> {
    fields
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeScoreResponse {
    #[serde(flatten)]
    pub score: ResumeScore,
    /// Extracted text, returned so the caller can store it on the candidate.
    pub resume_text: String,
    pub provider: ProviderKind,
}

/// POST /api/v1/resumes/score
pub async fn handle_score_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ResumeScoreResponse>, AppError> {
    let (upload, fields) = read_form(multipart).await?;
    let upload =
        upload.ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?;

    let mime_type = upload.mime_type();
    let resume_text = extract_text(upload.bytes, &upload.file_name, &mime_type).await?;
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not extract text from resume. Please upload a clear PDF or text-based file."
                .to_string(),
        ));
    }

    let jd_text = non_blank(&fields, "jd_text");
    info!(
        "Scoring resume {} ({} chars, JD provided: {})",
        upload.file_name,
        resume_text.chars().count(),
        jd_text.is_some()
    );

    let (score, provider) =
        generated(score_resume(&state.ai, &resume_text, jd_text.as_deref()).await?)?;

    Ok(Json(ResumeScoreResponse {
        score,
        resume_text,
        provider,
    }))
}

#[derive(Debug, Serialize)]
pub struct JdExtractionResponse {
    #[serde(flatten)]
    pub jd: JdExtraction,
    pub provider: ProviderKind,
}

/// POST /api/v1/jd/parse
///
/// Pasted text and .txt uploads go through the text prompt; any other file
/// is attached as inline binary.
pub async fn handle_parse_jd(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<JdExtractionResponse>, AppError> {
    let (upload, fields) = read_form(multipart).await?;

    let result = match (non_blank(&fields, "text"), upload) {
        (Some(text), _) => extract_jd_from_text(&state.ai, &text).await?,
        (None, Some(upload)) => {
            let mime_type = upload.mime_type();
            if is_plain_text(&mime_type, &upload.file_name) {
                let text = String::from_utf8_lossy(&upload.bytes).into_owned();
                extract_jd_from_text(&state.ai, &text).await?
            } else {
                info!("Parsing JD file {} as {}", upload.file_name, mime_type);
                let file = InlineBinary::from_bytes(mime_type, &upload.bytes);
                extract_jd_from_file(&state.ai, file).await?
            }
        }
        (None, None) => {
            return Err(AppError::Validation(
                "No file or text provided".to_string(),
            ))
        }
    };

    let (jd, provider) = generated(result)?;
    Ok(Json(JdExtractionResponse { jd, provider }))
}
