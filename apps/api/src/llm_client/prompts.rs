// Cross-cutting prompt framing shared by every stage.
// Stage-specific instructions live in pipeline/prompts.rs.

use crate::pipeline::agents::AgentConfig;
use crate::pipeline::prompts::StagePrompt;

/// Appended to every task so the model returns the deliverable itself.
pub const FINAL_ANSWER_INSTRUCTION: &str =
    "You MUST return the actual complete content as the final answer, not a summary.";

/// Builds the system message that gives the model its persona for one stage.
pub fn agent_system_prompt(agent: &AgentConfig) -> String {
    format!(
        "You are {}. {}\nYour personal goal is: {}",
        agent.role, agent.backstory, agent.goal
    )
}

/// Builds the user message: stage instructions plus the expected-output contract.
pub fn task_prompt(prompt: &StagePrompt) -> String {
    format!(
        "{}\n\nThis is the expected criteria for your final answer: {}\n{}",
        prompt.instructions, prompt.expected_output, FINAL_ANSWER_INSTRUCTION
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::agents::REFINER;

    #[test]
    fn test_system_prompt_carries_persona() {
        let system = agent_system_prompt(&REFINER);
        assert!(system.starts_with("You are Bullet Point Refiner."));
        assert!(system.contains(REFINER.backstory));
        assert!(system.contains(REFINER.goal));
    }

    #[test]
    fn test_task_prompt_appends_contract() {
        let prompt = StagePrompt {
            instructions: "Polish these bullets".to_string(),
            expected_output: "Resume with enhanced bullet points and metrics.",
        };
        let text = task_prompt(&prompt);
        assert!(text.starts_with("Polish these bullets\n\n"));
        assert!(text.contains("Resume with enhanced bullet points and metrics."));
        assert!(text.ends_with(FINAL_ANSWER_INSTRUCTION));
    }
}
