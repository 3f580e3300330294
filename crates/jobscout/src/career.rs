//! Career-assistance features layered on the same model routing the agent
//! uses: match scoring, resume tailoring, cover letters and interview prep.
//! These are single-shot prompt calls — no tools involved.
use anyhow::Result;
use indoc::formatdoc;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::providers::router::FallbackRouter;

/// How well a resume matches a job description, as judged by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    #[serde(default)]
    pub score: u8,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub verdict: String,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, Display)]
pub enum CoverLetterTone {
    #[strum(serialize = "professional and formal")]
    Professional,
    #[strum(serialize = "enthusiastic and energetic")]
    Enthusiastic,
    #[strum(serialize = "concise and direct")]
    Concise,
}

pub struct CareerAssistant<'a> {
    router: &'a FallbackRouter,
}

impl<'a> CareerAssistant<'a> {
    pub fn new(router: &'a FallbackRouter) -> Self {
        Self { router }
    }

    async fn prompt(&self, text: String) -> Result<String> {
        let messages = vec![crate::models::message::Message::user().with_text(text)];
        let response = self.router.chat("", &messages, &[]).await?;
        Ok(response.text.trim().to_string())
    }

    /// Score a resume against a job description. A model that answers with
    /// something other than the requested JSON still produces a usable
    /// report: the raw text lands in the verdict.
    pub async fn score_match(&self, resume: &str, job_description: &str) -> Result<MatchReport> {
        let prompt = formatdoc! {r#"
            You are an expert ATS (Applicant Tracking System) and career coach.

            Analyse how well this resume matches the job description and return a JSON object ONLY (no other text).

            RESUME:
            {resume}

            JOB DESCRIPTION:
            {job_description}

            Return this exact JSON structure:
            {{
              "score": <integer 0-100>,
              "grade": "<A/B/C/D/F>",
              "verdict": "<one sentence summary>",
              "matched_keywords": ["keyword1", "keyword2", ...],
              "missing_skills": ["skill1", "skill2", ...],
              "strengths": ["strength1", "strength2", "strength3"],
              "weaknesses": ["weakness1", "weakness2", "weakness3"],
              "recommendation": "<2-3 sentence actionable advice>"
            }}"#};

        let raw = self.prompt(prompt).await?;
        let cleaned = strip_code_fences(&raw);

        Ok(serde_json::from_str(cleaned).unwrap_or_else(|err| {
            tracing::warn!(%err, "match report was not valid JSON, falling back to raw text");
            MatchReport {
                score: 0,
                grade: "?".to_string(),
                verdict: cleaned.to_string(),
                matched_keywords: Vec::new(),
                missing_skills: Vec::new(),
                strengths: Vec::new(),
                weaknesses: Vec::new(),
                recommendation: String::new(),
            }
        }))
    }

    /// Rewrite resume bullets toward a job description without inventing
    /// experience.
    pub async fn tailor_resume(&self, resume: &str, job_description: &str) -> Result<String> {
        let prompt = formatdoc! {"
            You are an expert resume writer and career coach.

            Rewrite the resume below to better match the job description. Follow these rules:
            1. Keep all the same jobs, companies, dates and education — do NOT invent anything
            2. Rewrite bullet points to use keywords from the job description naturally
            3. Reorder bullets so the most relevant ones come first
            4. Add ATS-friendly keywords from the job description where they genuinely apply
            5. Keep the same format and structure
            6. Make it sound natural and human, not keyword-stuffed

            ORIGINAL RESUME:
            {resume}

            JOB DESCRIPTION:
            {job_description}

            Output the full tailored resume only. No explanations, no preamble."};

        self.prompt(prompt).await
    }

    pub async fn cover_letter(
        &self,
        resume: &str,
        job_description: &str,
        applicant_name: &str,
        hiring_manager: &str,
        tone: CoverLetterTone,
    ) -> Result<String> {
        let prompt = formatdoc! {"
            Write a compelling, personalized cover letter for this job application.

            Applicant Name: {applicant_name}
            Hiring Manager: {hiring_manager}
            Tone: {tone}

            APPLICANT'S RESUME:
            {resume}

            JOB DESCRIPTION:
            {job_description}

            Instructions:
            - Open with a strong hook that shows genuine interest in THIS company specifically
            - Connect 2-3 specific experiences from the resume to the job requirements
            - Show knowledge of what the company does and why you want to work there
            - Close with a confident call to action
            - Keep it to 3-4 short paragraphs (under 350 words)
            - Do NOT use clichés like \"I am writing to express my interest\"
            - Sound like a real human, not a template
            - Address it to: {hiring_manager}

            Write the cover letter only. No explanations."};

        self.prompt(prompt).await
    }

    pub async fn interview_prep(
        &self,
        resume: &str,
        job_description: &str,
        company: &str,
        role: &str,
    ) -> Result<String> {
        let prompt = formatdoc! {"
            You are an expert interview coach preparing a candidate for a job interview.

            Generate a comprehensive interview preparation guide for this role.

            CANDIDATE'S RESUME:
            {resume}

            JOB DESCRIPTION:
            {job_description}
            COMPANY: {company}
            ROLE: {role}

            Create the following sections:

            ## 1. LIKELY INTERVIEW QUESTIONS (10 questions)
            For each question:
            - The question
            - Why they ask it
            - A suggested answer framework using the STAR method (Situation, Task, Action, Result)
            - Key points to mention from the resume

            Include a mix of:
            - Behavioural questions (\"Tell me about a time...\")
            - Technical questions specific to this role
            - Company/culture fit questions
            - \"Why this company?\" type questions

            ## 2. QUESTIONS TO ASK THE INTERVIEWER (5 smart questions)
            Questions that show genuine interest and intelligence.

            ## 3. KEY THINGS TO RESEARCH BEFORE THE INTERVIEW
            What to look up about the company, team, and role.

            ## 4. RED FLAGS TO WATCH FOR
            Things in this role/company description that might be worth clarifying.

            Be specific to THIS role and company. Not generic advice."};

        self.prompt(prompt).await
    }
}

/// Models love to wrap JSON in markdown fences; peel them off before parsing.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}
