/// Screening: resume scoring and job description extraction from uploads.
pub mod documents;
pub mod handlers;
pub mod jd_extract;
pub mod prompts;
pub mod resume_score;
