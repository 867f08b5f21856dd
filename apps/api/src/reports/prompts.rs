// Prompt constants for the Reports module.
// Reuses cross-cutting fragments from ai::prompts.

/// Characters of resume text embedded in the final-report prompt.
pub const REPORT_RESUME_BUDGET: usize = 3_000;
/// Characters of serialized transcript embedded in the final-report prompt.
pub const REPORT_TRANSCRIPT_BUDGET: usize = 5_000;
/// Characters of each serialized input embedded in the feedback prompt.
pub const FEEDBACK_INPUT_BUDGET: usize = 8_000;

pub const RESUME_TEXT_FALLBACK: &str = "Resume text not available";

/// System prompt for the final interview report.
pub const FINAL_REPORT_SYSTEM: &str = "You are an expert HR Interviewer and Career Coach. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Final-report prompt template.
/// Replace: {title}, {job_description}, {resume_text}, {transcript}
pub const FINAL_REPORT_PROMPT_TEMPLATE: &str = r#"Generate a comprehensive "Intelligence Report" for a candidate based on their interview.
This report will be used for BOTH hiring decisions and candidate career coaching.

**Job Position/Description:**
{title}
{job_description}

**Candidate Resume Info:**
{resume_text}

**Interview Transcript:**
{transcript}

**Task:**
Analyze the candidate deeply based on the JD, Resume, and Interview performance.
**STRICT REQUIREMENT: EVIDENCE-BASED FEEDBACK.**
Do NOT provide generic tips like "Improve communication". Instead, provide quantifiable or citeable evidence (e.g., "Candidate used 'um' 12 times in the intro" or "Strong evidence provided for React hooks implementation in Project Alpha, but failed to explain the Virtual DOM concept when challenged").

**Output Format (JSON Only):**
{
  "strengths": [".. (with specific session evidence)", ".."],
  "weaknesses": [".. (with specific session evidence)", ".."],
  "hiringRecommendation": "Strong Hire" | "Hire" | "Weak Hire" | "No Hire",
  "riskFlags": [".. (e.g., 'Generic answer used for behavioral prompt')"],
  "finalScore": 0-100,
  "communicationScore": 0-100,
  "skillsScore": 0-100,
  "knowledgeScore": 0-100,
  "summary": "Deep-dive summary citing specific performance highlights.",
  "communication_coaching": {
    "verbal_delivery": ["Evidence-based tip (e.g., 'Watch filler words in technical explanations')"],
    "structuring_answers": ["Evidence-based tip (e.g., 'Use STAR method more clearly for the conflict prompt')"]
  },
  "resume_vs_reality": {
    "verified_claims": ["Citations of verified resume claims from session"],
    "exaggerated_claims": ["Citations of claims candidate couldn't justify"],
    "missing_skills": ["JD requirements candidate lacked evidence for"]
  },
  "strategic_recommendations": {
    "resume_edits": ["Specific resume changes based on this interview's gaps"],
    "study_focus": ["High-priority technical topics to brush up on"]
  }
}

All scores are integers between 0 and 100."#;

/// System prompt for feedback synthesis.
pub const FEEDBACK_SYSTEM: &str = "You are an expert Interview Analyst and Career Coach Agent. \
    You MUST respond with valid JSON only. \
    Do NOT include markdown formatting, introductions, or explanations.";

/// Feedback-synthesis prompt template.
/// Replace: {resume_data}, {feedback_data}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Perform a deep-dive analysis of a candidate by synthesizing their **Resume Data** and **Interview Feedback**.

====================
RESUME DATA
====================
{resume_data}

====================
INTERVIEW FEEDBACK DATA
====================
{feedback_data}

### INSTRUCTIONS:
1. Extract core data from the resume.
2. Analyze the feedback for technical, behavioral, and communication patterns.
3. Compare the resume claims against the interview reality.
4. Provide specific coaching on **Communication** (tone, pace, clarity).
5. Output the result in the strict JSON format below.

### OUTPUT FORMAT:
{
  "resume_data_extraction": {
    "candidate_name": "String",
    "years_experience": "Number",
    "education": "String",
    "target_role": "String"
  },
  "performance_metrics": [
    { "metric": "Technical Proficiency", "score": 0-100, "description": "Assessment of core technical skills and knowledge" },
    { "metric": "Behavioral Alignment", "score": 0-100, "description": "Fit with company values and situational responses" },
    { "metric": "Communication Clarity", "score": 0-100, "description": "Effectiveness of verbal delivery and answer structure" },
    { "metric": "Problem Solving", "score": 0-100, "description": "Ability to handle complex questions and logic" },
    { "metric": "Cultural Alignment", "score": 0-100, "description": "Potential impact on team dynamics" }
  ],
  "feedback_analysis": {
    "summary": "String",
    "overall_rating": "String (e.g. Excellent, Good, Average, Poor)",
    "key_observations": ["Array of strings"]
  },
  "overall_assessment": {
    "hiring_status": "String (e.g., Strong Hire, Hire, Weak Hire, No Hire)",
    "match_score": "Number (0-100)",
    "verdict_summary": "String"
  },
  "skill_analysis": {
    "strengths": ["Array of validated skills"],
    "weaknesses": ["Array of struggling areas"],
    "soft_skills": ["Array of communication/culture notes"]
  },
  "resume_vs_reality": {
    "verified_claims": ["Resume points proven true"],
    "exaggerated_claims": ["Resume points proven weak"],
    "missing_skills": ["Skills expected but not found"]
  },
  "strategic_recommendations": {
    "resume_edits": ["Specific changes to the document"],
    "role_fit": ["Better suited job titles"],
    "study_focus": ["High priority topics"]
  },
  "actionable_tips_and_tricks": {
    "immediate_fixes": ["Quick behavioral/technical adjustments"],
    "interview_hacks": ["Psychological tricks to build rapport"]
  },
  "skilltips": {
    "coding_tips": ["Specific advice for their coding style"],
    "system_design_tips": ["Advice for architecture discussions"],
    "behavioral_tips": ["Advice for situational questions"]
  },
  "communication_coaching": {
    "verbal_delivery": ["Tips on tone, pace, volume, and filler words"],
    "structuring_answers": ["Tips on being concise vs detailed (e.g., Bottom Line Up Front)"]
  }
}"#;
