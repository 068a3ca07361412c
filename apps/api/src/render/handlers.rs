use axum::{
    extract::{Path, Query},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::render::{render, DownloadFormat};

#[derive(Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub text: String,
}

/// Keeps `kind` safe for a Content-Disposition filename.
fn sanitize_kind(kind: &str) -> String {
    let cleaned: String = kind
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(32)
        .collect();
    if cleaned.is_empty() {
        "final".to_string()
    } else {
        cleaned
    }
}

/// GET /api/v1/download/:format/:kind?text=...
pub async fn handle_download(
    Path((format, kind)): Path<(String, String)>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    if query.text.trim().is_empty() {
        return Err(AppError::Validation("No resume text provided".to_string()));
    }
    let format: DownloadFormat = format
        .parse()
        .map_err(|_| AppError::Validation("Invalid format".to_string()))?;
    let kind = sanitize_kind(&kind);

    let text = query.text;
    let bytes = tokio::task::spawn_blocking(move || render(format, &text))
        .await
        .map_err(|e| anyhow::anyhow!("render task join error: {e}"))??;

    info!(
        "Rendered {} download '{kind}' ({} bytes)",
        format.extension(),
        bytes.len()
    );

    let disposition = format!(
        "attachment; filename=\"{kind}_resume.{}\"",
        format.extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(bytes),
    )
        .into_response())
}
