pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers::handle_process;
use crate::render::handlers::handle_download;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/process", post(handle_process))
        .route("/api/v1/download/:format/:kind", get(handle_download))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
