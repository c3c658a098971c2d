//! Ask endpoint: one upload, one question, one answer

use axum::{
    extract::{multipart::Field, Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{Error, Result};
use crate::pipeline::{Failure, Stage};
use crate::server::state::AppState;
use crate::types::{AskResponse, SubmitForm, UploadedFile};

/// Content type assumed when the browser sends none
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// POST /api/ask - Run the whole pipeline for one submit
pub async fn ask_document(State(state): State<AppState>, multipart: Multipart) -> Response {
    let pipeline = state.pipeline();

    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::info!("Rejected malformed submit: {}", e);
            return Failure::new(Stage::Inputs, &e, pipeline.locale()).into_response();
        }
    };

    let k = form.k.unwrap_or(pipeline.bounds().default_k);
    let strategy = form.strategy.unwrap_or_default();

    let report = {
        let _guard = state.acquire_run().await;
        pipeline.submit(form).await
    };

    match report.outcome {
        Ok(answer) => {
            let elapsed_ms = report.elapsed.as_millis() as u64;
            Json(AskResponse::new(answer, strategy, k, elapsed_ms)).into_response()
        }
        Err(failure) => failure.into_response(),
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "type": self.kind.as_str(),
                "message": self.message,
            }
        }));
        (self.kind.status_code(), body).into_response()
    }
}

/// Collect the multipart fields into a form; unknown fields are ignored
async fn read_form(mut multipart: Multipart) -> Result<SubmitForm> {
    let mut form = SubmitForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => form.file = read_file(field).await?,
            "api_key" => form.api_key = Some(read_text(field).await?),
            "question" => form.question = Some(read_text(field).await?),
            "k" => {
                let raw = read_text(field).await?;
                if !raw.trim().is_empty() {
                    let k = raw.trim().parse::<usize>().map_err(|_| {
                        Error::InvalidParameter(format!("k must be an integer, got '{}'", raw))
                    })?;
                    form.k = Some(k);
                }
            }
            "strategy" => {
                let raw = read_text(field).await?;
                if !raw.trim().is_empty() {
                    form.strategy = Some(raw.parse()?);
                }
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| Error::BadRequest(format!("Failed to read form field: {}", e)))
}

/// An empty file part means no file was chosen
async fn read_file(field: Field<'_>) -> Result<Option<UploadedFile>> {
    let filename = field.file_name().unwrap_or("").to_string();
    let content_type = field
        .content_type()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| Error::BadRequest(format!("Failed to read file: {}", e)))?;

    if filename.is_empty() && data.is_empty() {
        return Ok(None);
    }

    tracing::info!("Received file: {} ({}, {} bytes)", filename, content_type, data.len());
    Ok(Some(UploadedFile::new(filename, content_type, data.to_vec())))
}
