use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::Generator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generation capability behind every pipeline stage. `LlmClient` in production.
    pub generator: Arc<dyn Generator>,
    pub config: Config,
}
