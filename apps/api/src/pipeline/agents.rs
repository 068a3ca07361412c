//! Per-stage agent configurations. Static, never mutated at runtime.

/// Wall-clock budget for a single stage's generation call.
pub const STAGE_TIMEOUT_SECS: u64 = 120;

/// Persona and tuning for one pipeline stage.
///
/// `temperature` is the determinism setting: 0.0 favors exact, reproducible output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentConfig {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub temperature: f32,
    pub max_attempts: u32,
    pub timeout_secs: u64,
}

/// Stage 1: cleans and structures raw extracted text. Deterministic.
pub static PARSER: AgentConfig = AgentConfig {
    role: "Resume Parsing Specialist",
    goal: "Extract clean, structured text from a resume suitable for ATS optimization.",
    backstory: "You efficiently clean resume text by removing artifacts and normalizing \
        formatting. Focus on speed and accuracy - preserve all important content while \
        removing noise.",
    temperature: 0.0,
    max_attempts: 1,
    timeout_secs: STAGE_TIMEOUT_SECS,
};

/// Stage 2: rewrites against the job description. Slight creativity for natural language.
pub static WRITER: AgentConfig = AgentConfig {
    role: "ATS Optimization Writer",
    goal: "Create a high-scoring ATS-optimized resume that matches job requirements perfectly.",
    backstory: "You are an expert at transforming resumes into ATS-friendly formats that \
        score 80+ points. You strategically place keywords, use strong action verbs, and \
        quantify all achievements. You work quickly and deliver results that pass ATS systems.",
    temperature: 0.3,
    max_attempts: 1,
    timeout_secs: STAGE_TIMEOUT_SECS,
};

/// Stage 3: bullet polishing. Low creativity, focused on structure.
pub static REFINER: AgentConfig = AgentConfig {
    role: "Bullet Point Refiner",
    goal: "Transform bullet points into high-impact, ATS-optimized statements with strong metrics.",
    backstory: "You excel at creating powerful bullet points that combine action verbs, \
        specific achievements, and quantified results. You work efficiently to maximize impact.",
    temperature: 0.2,
    max_attempts: 1,
    timeout_secs: STAGE_TIMEOUT_SECS,
};

/// Stage 4: scoring. Deterministic so repeated runs give stable scores.
pub static EVALUATOR: AgentConfig = AgentConfig {
    role: "ATS Evaluator",
    goal: "Provide accurate ATS scores and actionable improvement recommendations.",
    backstory: "You are a precise ATS scoring expert who quickly identifies gaps and provides \
        specific, actionable recommendations. You focus on keyword density, section \
        structure, and measurable achievements.",
    temperature: 0.0,
    max_attempts: 1,
    timeout_secs: STAGE_TIMEOUT_SECS,
};
