//! Pipeline orchestrator: runs the four stages in strict sequence.
//!
//! Flow: parse(raw_text) → rewrite(cleaned, job) → refine(rewritten) → evaluate(final, job).
//!
//! Each stage is executed and its real, trimmed output is passed to the next stage as a
//! typed argument. A stage only ever sees its immediate predecessor's output plus the
//! constant job fields. Any stage failure aborts the whole run; no partial result escapes.

use std::fmt;
use std::time::Instant;

use thiserror::Error;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::llm_client::{Generator, LlmError};
use crate::pipeline::agents::{AgentConfig, EVALUATOR, PARSER, REFINER, WRITER};
use crate::pipeline::evaluation::{parse_evaluation, Evaluation};
use crate::pipeline::prompts::{
    evaluate_prompt, parse_prompt, refine_prompt, rewrite_prompt, StagePrompt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Rewrite,
    Refine,
    Evaluate,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Rewrite => "rewrite",
            Stage::Refine => "refine",
            Stage::Evaluate => "evaluate",
        }
    }

    pub fn agent(self) -> &'static AgentConfig {
        match self {
            Stage::Parse => &PARSER,
            Stage::Rewrite => &WRITER,
            Stage::Refine => &REFINER,
            Stage::Evaluate => &EVALUATOR,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A run-level failure: which stage broke and why.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: LlmError,
}

/// Immutable input to a single run.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub raw_text: String,
    pub job_title: String,
    pub job_description: String,
}

/// All four stage artifacts of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub cleaned: String,
    pub rewritten: String,
    pub final_resume: String,
    /// Raw text of the evaluation stage. See `evaluation_report` for the parsed form.
    pub evaluation: String,
}

impl PipelineResult {
    pub fn evaluation_report(&self) -> Evaluation {
        parse_evaluation(&self.evaluation)
    }
}

/// Runs parse → rewrite → refine → evaluate. Either all four stages complete or the
/// run fails with the first stage error.
pub async fn run_pipeline(
    generator: &dyn Generator,
    request: &PipelineRequest,
) -> Result<PipelineResult, PipelineError> {
    let run_id = Uuid::new_v4();

    async move {
        let started = Instant::now();
        info!(
            "Pipeline started: {} chars of resume text for '{}'",
            request.raw_text.chars().count(),
            request.job_title
        );

        let cleaned = parse_stage(generator, &request.raw_text).await?;
        let rewritten = rewrite_stage(
            generator,
            &cleaned,
            &request.job_title,
            &request.job_description,
        )
        .await?;
        let final_resume = refine_stage(generator, &rewritten).await?;
        let evaluation = evaluate_stage(
            generator,
            &final_resume,
            &request.job_title,
            &request.job_description,
        )
        .await?;

        info!(
            "Pipeline completed in {}ms",
            started.elapsed().as_millis()
        );

        Ok(PipelineResult {
            cleaned,
            rewritten,
            final_resume,
            evaluation,
        })
    }
    .instrument(info_span!("pipeline", %run_id))
    .await
}

async fn parse_stage(generator: &dyn Generator, raw_text: &str) -> Result<String, PipelineError> {
    execute(generator, Stage::Parse, parse_prompt(raw_text)).await
}

async fn rewrite_stage(
    generator: &dyn Generator,
    cleaned: &str,
    job_title: &str,
    job_description: &str,
) -> Result<String, PipelineError> {
    execute(
        generator,
        Stage::Rewrite,
        rewrite_prompt(cleaned, job_title, job_description),
    )
    .await
}

async fn refine_stage(generator: &dyn Generator, rewritten: &str) -> Result<String, PipelineError> {
    execute(generator, Stage::Refine, refine_prompt(rewritten)).await
}

async fn evaluate_stage(
    generator: &dyn Generator,
    final_resume: &str,
    job_title: &str,
    job_description: &str,
) -> Result<String, PipelineError> {
    execute(
        generator,
        Stage::Evaluate,
        evaluate_prompt(final_resume, job_title, job_description),
    )
    .await
}

/// Invokes the generator for one stage and trims the result.
/// Blank output counts as a failure so no later stage runs on empty text.
async fn execute(
    generator: &dyn Generator,
    stage: Stage,
    prompt: StagePrompt,
) -> Result<String, PipelineError> {
    let started = Instant::now();
    info!(
        "Stage {stage} started ({} prompt chars)",
        prompt.instructions.chars().count()
    );

    let output = generator
        .generate(stage.agent(), &prompt)
        .await
        .map_err(|source| {
            error!("Stage {stage} failed: {source}");
            PipelineError { stage, source }
        })?;

    let output = output.trim();
    if output.is_empty() {
        error!("Stage {stage} returned blank output");
        return Err(PipelineError {
            stage,
            source: LlmError::EmptyContent,
        });
    }

    info!(
        "Stage {stage} completed in {}ms ({} output chars)",
        started.elapsed().as_millis(),
        output.chars().count()
    );

    Ok(output.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::prompts::TRUNCATION_MARKER;
    use crate::pipeline::testing::ScriptedGenerator;

    fn request(raw_text: &str) -> PipelineRequest {
        PipelineRequest {
            raw_text: raw_text.to_string(),
            job_title: "Software Engineer".to_string(),
            job_description: "Build backend services in Python and SQL.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_four_stages_return_trimmed_outputs() {
        let generator = ScriptedGenerator::new(&[
            "\n  John Doe\nSoftware Engineer\n- Worked on backend services  \n",
            "John Doe\nSoftware Engineer\n- Built Python services",
            "John Doe\nSoftware Engineer\n- Built 12 Python services serving 1M users",
            "{'overall_score': 72, 'missing_keywords': ['Python','SQL'], 'quick_wins': ['Add metrics']}",
        ]);

        let result = run_pipeline(
            &generator,
            &request("john doe\nsoftware engineer\n- worked on stuff"),
        )
        .await
        .unwrap();

        assert_eq!(
            result.cleaned,
            "John Doe\nSoftware Engineer\n- Worked on backend services"
        );
        assert_eq!(result.cleaned, result.cleaned.trim());
        assert!(!result.rewritten.is_empty());
        assert!(!result.final_resume.is_empty());
        assert!(!result.evaluation.is_empty());
        assert_eq!(result.evaluation_report().overall_score(), Some(72));
        assert_eq!(generator.call_count(), 4);
    }

    #[tokio::test]
    async fn test_stages_run_in_order_with_their_agents() {
        let generator = ScriptedGenerator::new(&["one", "two", "three", "four"]);
        run_pipeline(&generator, &request("raw")).await.unwrap();

        let roles: Vec<_> = generator.calls().iter().map(|c| c.role).collect();
        assert_eq!(
            roles,
            vec![
                "Resume Parsing Specialist",
                "ATS Optimization Writer",
                "Bullet Point Refiner",
                "ATS Evaluator"
            ]
        );
        let temperatures: Vec<_> = generator.calls().iter().map(|c| c.temperature).collect();
        assert_eq!(temperatures, vec![0.0, 0.3, 0.2, 0.0]);
    }

    #[tokio::test]
    async fn test_each_stage_sees_only_its_predecessor() {
        let generator = ScriptedGenerator::new(&[
            "  CLEANED-TOKEN  ",
            "REWRITTEN-TOKEN",
            "FINAL-TOKEN",
            "{}",
        ]);
        run_pipeline(&generator, &request("RAW-TOKEN")).await.unwrap();

        let prompts: Vec<String> = generator
            .calls()
            .into_iter()
            .map(|c| c.prompt.instructions)
            .collect();

        assert!(prompts[0].contains("RAW-TOKEN"));

        assert!(prompts[1].contains("RESUME: CLEANED-TOKEN\n"));
        assert!(!prompts[1].contains("RAW-TOKEN"));

        assert!(prompts[2].contains("REWRITTEN-TOKEN"));
        assert!(!prompts[2].contains("CLEANED-TOKEN"));
        assert!(!prompts[2].contains("RAW-TOKEN"));
        assert!(!prompts[2].contains("Software Engineer"));

        assert!(prompts[3].contains("FINAL-TOKEN"));
        assert!(!prompts[3].contains("REWRITTEN-TOKEN"));
        assert!(!prompts[3].contains("CLEANED-TOKEN"));
        assert!(!prompts[3].contains("RAW-TOKEN"));
        assert!(prompts[3].contains("Score this resume for Software Engineer"));
    }

    #[tokio::test]
    async fn test_long_raw_text_truncated_in_first_prompt() {
        let raw = format!("{}{}", "x".repeat(1500), "#".repeat(3500));
        let generator = ScriptedGenerator::new(&["a", "b", "c", "d"]);
        run_pipeline(&generator, &request(&raw)).await.unwrap();

        let first = &generator.calls()[0].prompt.instructions;
        assert!(first.contains(&format!("{}{TRUNCATION_MARKER}", "x".repeat(1500))));
        assert!(!first.contains('#'));
    }

    #[tokio::test]
    async fn test_rewrite_failure_fails_whole_run() {
        let generator = ScriptedGenerator::failing_on(&["cleaned text", "", "", ""], 2);

        let err = run_pipeline(&generator, &request("raw")).await.unwrap_err();

        assert_eq!(err.stage, Stage::Rewrite);
        assert!(matches!(err.source, LlmError::Api { status: 503, .. }));
        assert_eq!(generator.call_count(), 2, "later stages must not run");
    }

    #[tokio::test]
    async fn test_blank_stage_output_aborts_run() {
        let generator = ScriptedGenerator::new(&["cleaned", "rewritten", "   \n", "{}"]);

        let err = run_pipeline(&generator, &request("raw")).await.unwrap_err();

        assert_eq!(err.stage, Stage::Refine);
        assert!(matches!(err.source, LlmError::EmptyContent));
        assert_eq!(generator.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unparseable_evaluation_is_kept_raw() {
        let generator =
            ScriptedGenerator::new(&["a", "b", "c", "  Solid resume; add more metrics.  "]);
        let result = run_pipeline(&generator, &request("raw")).await.unwrap();

        assert_eq!(
            result.evaluation_report(),
            Evaluation::Raw {
                raw: "Solid resume; add more metrics.".to_string()
            }
        );
    }

    #[test]
    fn test_pipeline_error_names_stage() {
        let err = PipelineError {
            stage: Stage::Evaluate,
            source: LlmError::Timeout { secs: 120 },
        };
        assert_eq!(
            err.to_string(),
            "evaluate stage failed: LLM call timed out after 120s"
        );
    }
}
