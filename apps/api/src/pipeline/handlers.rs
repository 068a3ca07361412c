use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::{detect_and_extract, is_allowed_filename};
use crate::pipeline::evaluation::Evaluation;
use crate::pipeline::orchestrator::{run_pipeline, PipelineRequest};
use crate::state::AppState;

/// Raw multipart fields of a process request, before validation.
#[derive(Debug, Default)]
pub struct ProcessForm {
    pub resume: Option<UploadedFile>,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// A request that passed validation and has a readable resume file.
#[derive(Debug)]
pub struct ValidatedUpload {
    pub filename: String,
    pub bytes: Bytes,
    pub job_title: String,
    pub job_description: String,
}

#[derive(Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub cleaned: String,
    pub rewritten: String,
    #[serde(rename = "final")]
    pub final_resume: String,
    pub evaluation: Evaluation,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate(form: ProcessForm) -> Result<ValidatedUpload, AppError> {
    let resume = form
        .resume
        .ok_or_else(|| AppError::Validation("No resume file uploaded".to_string()))?;
    if resume.filename.trim().is_empty() {
        return Err(AppError::Validation("No file selected".to_string()));
    }

    let (Some(job_title), Some(job_description)) =
        (non_blank(form.job_title), non_blank(form.job_description))
    else {
        return Err(AppError::Validation(
            "Job title and description are required".to_string(),
        ));
    };

    if !is_allowed_filename(&resume.filename) {
        return Err(AppError::Validation(
            "Invalid file type. Use PDF, DOCX, or TXT".to_string(),
        ));
    }

    Ok(ValidatedUpload {
        filename: resume.filename,
        bytes: resume.bytes,
        job_title,
        job_description,
    })
}

async fn read_form(mut multipart: Multipart) -> Result<ProcessForm, AppError> {
    let mut form = ProcessForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
                form.resume = Some(UploadedFile { filename, bytes });
            }
            "job_title" | "job_description" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read {name}: {e}")))?;
                if name == "job_title" {
                    form.job_title = Some(value);
                } else {
                    form.job_description = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/v1/process
pub async fn handle_process(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProcessResponse>, AppError> {
    let upload = validate(read_form(multipart).await?)?;

    let filename = upload.filename.clone();
    let bytes = upload.bytes;
    let extracted = tokio::task::spawn_blocking(move || detect_and_extract(&filename, &bytes))
        .await
        .map_err(|e| {
            warn!("Extraction task failed: {e}");
            AppError::Validation("Could not extract text from file".to_string())
        })?;

    if extracted.text.trim().is_empty() {
        warn!(
            "No text extracted from '{}' ({})",
            upload.filename, extracted.format
        );
        return Err(AppError::Validation(
            "Could not extract text from file".to_string(),
        ));
    }

    info!(
        "Extracted {} chars from '{}' ({})",
        extracted.text.chars().count(),
        upload.filename,
        extracted.format
    );

    let request = PipelineRequest {
        raw_text: extracted.text,
        job_title: upload.job_title,
        job_description: upload.job_description,
    };
    let result = run_pipeline(state.generator.as_ref(), &request).await?;
    let evaluation = result.evaluation_report();

    Ok(Json(ProcessResponse {
        success: true,
        cleaned: result.cleaned,
        rewritten: result.rewritten,
        final_resume: result.final_resume,
        evaluation,
    }))
}
