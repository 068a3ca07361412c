//! Test doubles for the generation capability.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{Generator, LlmError};
use crate::pipeline::agents::AgentConfig;
use crate::pipeline::prompts::StagePrompt;

/// A recorded generation call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub role: &'static str,
    pub temperature: f32,
    pub prompt: StagePrompt,
}

/// Replies with canned outputs in call order and records every prompt it receives.
/// When `fail_on_call` is set, that call (1-based) fails with an API error.
pub struct ScriptedGenerator {
    replies: Vec<String>,
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGenerator {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(replies: &[&str], call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new(replies)
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(
        &self,
        agent: &AgentConfig,
        prompt: &StagePrompt,
    ) -> Result<String, LlmError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                role: agent.role,
                temperature: agent.temperature,
                prompt: prompt.clone(),
            });
            calls.len()
        };

        if self.fail_on_call == Some(index) {
            return Err(LlmError::Api {
                status: 503,
                message: "provider unavailable".to_string(),
            });
        }

        self.replies
            .get(index - 1)
            .cloned()
            .ok_or(LlmError::EmptyContent)
    }
}
