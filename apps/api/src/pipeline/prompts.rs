//! Stage prompt templates.
//!
//! Each builder embeds its upstream text truncated to a fixed character budget.
//! Budgets shrink as the pipeline narrows, which keeps latency and cost bounded.

use std::borrow::Cow;

/// Appended to any text cut at its budget.
pub const TRUNCATION_MARKER: &str = "...";

pub const PARSE_INPUT_BUDGET: usize = 1500;
pub const REWRITE_RESUME_BUDGET: usize = 1200;
pub const REWRITE_JD_BUDGET: usize = 300;
pub const REFINE_INPUT_BUDGET: usize = 1000;
pub const EVALUATE_RESUME_BUDGET: usize = 800;
pub const EVALUATE_JD_BUDGET: usize = 200;

pub const PARSE_EXPECTED_OUTPUT: &str = "Clean resume text with proper structure.";
pub const REWRITE_EXPECTED_OUTPUT: &str =
    "ATS-optimized resume with keyword placement and metrics.";
pub const REFINE_EXPECTED_OUTPUT: &str = "Resume with enhanced bullet points and metrics.";

/// Advisory output contract for the scoring stage. Not enforced at runtime.
pub const EVALUATE_EXPECTED_OUTPUT: &str = r#"JSON evaluation with scores and recommendations, shaped as:
{
  "overall_score": 0-100,
  "breakdown": {"keywords": 1-5, "structure": 1-5, "metrics": 1-5, "verbs": 1-5, "format": 1-5},
  "missing_keywords": ["keyword"],
  "quick_wins": ["recommendation"]
}"#;

const PARSE_DIRECTIVE: &str =
    "Remove artifacts, normalize bullets to '-', keep all content. Be fast and direct.";
const REWRITE_DIRECTIVE: &str =
    "Match keywords, use action verbs, add metrics. Target 80+ ATS score. Be direct and fast.";
const REFINE_DIRECTIVE: &str = "Add strong verbs and numbers. Be fast and direct.";
const EVALUATE_DIRECTIVE: &str = "Rate 1-5: keywords, structure, metrics, verbs, format. \
    Return JSON with overall_score (0-100), breakdown, missing_keywords, quick_wins.";

/// A fully built stage prompt, ready for the generation capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePrompt {
    pub instructions: String,
    pub expected_output: &'static str,
}

/// Keeps the first `budget` characters and appends `TRUNCATION_MARKER` when `text` is longer.
/// Text at or under the budget is returned unchanged.
pub fn truncate(text: &str, budget: usize) -> Cow<'_, str> {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => Cow::Owned(format!("{}{TRUNCATION_MARKER}", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

/// Stage 1 prompt: built from the raw extracted text only.
pub fn parse_prompt(raw_text: &str) -> StagePrompt {
    StagePrompt {
        instructions: format!(
            "Clean this resume text quickly:\n\n{}\n\n{PARSE_DIRECTIVE}",
            truncate(raw_text, PARSE_INPUT_BUDGET)
        ),
        expected_output: PARSE_EXPECTED_OUTPUT,
    }
}

/// Stage 2 prompt: cleaned resume plus the job fields.
pub fn rewrite_prompt(cleaned: &str, job_title: &str, job_description: &str) -> StagePrompt {
    StagePrompt {
        instructions: format!(
            "Rewrite resume for {job_title}:\n\nJOB: {}\n\nRESUME: {}\n\n{REWRITE_DIRECTIVE}",
            truncate(job_description, REWRITE_JD_BUDGET),
            truncate(cleaned, REWRITE_RESUME_BUDGET)
        ),
        expected_output: REWRITE_EXPECTED_OUTPUT,
    }
}

/// Stage 3 prompt: rewritten resume only.
pub fn refine_prompt(rewritten: &str) -> StagePrompt {
    StagePrompt {
        instructions: format!(
            "Polish these bullets with action verbs and metrics:\n\n{}\n\n{REFINE_DIRECTIVE}",
            truncate(rewritten, REFINE_INPUT_BUDGET)
        ),
        expected_output: REFINE_EXPECTED_OUTPUT,
    }
}

/// Stage 4 prompt: final resume plus the job fields.
pub fn evaluate_prompt(final_resume: &str, job_title: &str, job_description: &str) -> StagePrompt {
    StagePrompt {
        instructions: format!(
            "Score this resume for {job_title}:\n\nJOB: {}\n\nRESUME: {}\n\n{EVALUATE_DIRECTIVE}",
            truncate(job_description, EVALUATE_JD_BUDGET),
            truncate(final_resume, EVALUATE_RESUME_BUDGET)
        ),
        expected_output: EVALUATE_EXPECTED_OUTPUT,
    }
}
