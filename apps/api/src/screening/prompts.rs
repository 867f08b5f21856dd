// Prompt constants for the Screening module (resume scoring, JD extraction).

/// Characters of resume text embedded in the scoring prompt.
pub const RESUME_SCORE_BUDGET: usize = 10_000;
/// Characters of JD text embedded in the extraction prompt.
pub const JD_TEXT_BUDGET: usize = 10_000;

pub const NO_JD_FALLBACK: &str = "No specific job description provided. \
    Evaluate based on general software engineering standards.";

/// System prompt for resume scoring.
pub const RESUME_SCORE_SYSTEM: &str = "You are an expert technical recruiter. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object.";

/// Resume scoring prompt template. Replace: {jd_text}, {resume_text}
pub const RESUME_SCORE_PROMPT_TEMPLATE: &str = r#"You are evaluating a candidate's resume for a specific job description.

**Job Description:**
{jd_text}

**Candidate Resume:**
{resume_text}

**Task:**
Analyze the resume specifically against the provided Job Description.
- strict matching of skills and experience to the JD.
- If the JD mentions specific technologies, prioritize them heavily.

Return a JSON object with scores (0-100).

Return JSON in the following structure:
{
  "skillsMatchScore": 0,
  "projectRelevanceScore": 0,
  "experienceSuitabilityScore": 0,
  "overallScore": 0,
  "overallRating": "Poor | Average | Good | Great",
  "strengths": ["bullet", "bullet"],
  "weaknesses": ["bullet", "bullet"]
}"#;

/// System prompt for JD extraction.
pub const JD_EXTRACT_SYSTEM: &str = "You are an expert job description analyst. \
    You MUST respond with valid JSON only. \
    Do NOT use markdown code fences.";

/// Shape shared by both JD extraction prompts.
pub const JD_EXTRACT_SCHEMA: &str = r#"{
  "title": "Job title/position name (e.g., 'Software Engineer - Google')",
  "jdName": "Short name for this job description (e.g., 'Google SWE JD 2024')",
  "interviewType": "Type of interview - one of: Technical, HR, Mixed, Coding Round (or null if not clear)",
  "duration": "Interview duration in minutes (as a number, or null if not mentioned)",
  "skills": ["array", "of", "key", "skills", "mentioned"],
  "summary": "Brief 2-3 sentence summary of the role"
}"#;

/// JD extraction from text. Replace: {schema}, {jd_text}
pub const JD_TEXT_PROMPT_TEMPLATE: &str = r#"Analyze the following job description and extract the following information in JSON format:
{schema}

Job Description:
{jd_text}"#;

/// JD extraction from an attached file. Replace: {schema}
pub const JD_FILE_PROMPT_TEMPLATE: &str = r#"Extract and analyze the Job Description from this file.

Extract the following information in JSON format:
{schema}"#;
