// ATS optimization pipeline: parse → rewrite → refine → evaluate.
// Every stage goes through the llm_client::Generator trait; no direct API calls here.

pub mod agents;
pub mod evaluation;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;

#[cfg(test)]
pub(crate) mod testing;
