//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use log::{error, info, warn};
use std::time::Instant;

use super::error::ApiError;
use super::types::{
    ApiState, HealthResponse, QuizRequest, QuizResponse, RootResponse, SummaryRequest,
    SummaryResponse,
};
use crate::generation::prompts::truncate_chars;
use crate::generation::UploadedDocument;
use crate::pdf_processor::is_pdf_filename;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shortest content accepted by the generation endpoints, after trimming
pub const MIN_CONTENT_CHARS: usize = 50;

/// Content is cut to this many characters before reaching the generation service
pub const API_MAX_CONTENT_CHARS: usize = 400;

/// Upper bound on questions per quiz request
pub const MAX_QUESTIONS: i64 = 20;

/// Multipart field carrying the uploaded document
const UPLOAD_FIELD: &str = "file";

/// `GET /`
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to Qrayti API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/docs".to_string(),
    })
}

/// `GET /health`
pub async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let ready = state.generation.is_ready();
    Json(HealthResponse {
        status: if ready { "healthy" } else { "initializing" }.to_string(),
        model_type: state.generation.description().to_string(),
        model_ready: ready,
    })
}

/// `POST /api/upload-pdf`
pub async fn upload_pdf(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> Result<Json<UploadedDocument>, ApiError> {
    let (file_name, data) = read_upload(multipart).await?;

    if !is_pdf_filename(&file_name) {
        return Err(ApiError::BadRequest("Only PDF files are allowed".to_string()));
    }

    let size_mb = data.len() as f64 / 1024.0 / 1024.0;
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::BadRequest(format!(
            "File too large ({:.1} MB). Maximum size is 50 MB.",
            size_mb
        )));
    }

    info!("Processing PDF: {} ({:.2} MB)", file_name, size_mb);
    let started = Instant::now();

    let processor = state.pdf;
    let name = file_name.clone();
    let document = tokio::task::spawn_blocking(move || processor.process(&name, &data))
        .await
        .map_err(|e| {
            error!("PDF extraction task failed: {}", e);
            ApiError::Internal(format!("Error processing PDF: {}", e))
        })?
        .map_err(|e| {
            warn!("PDF rejected: {}: {}", file_name, e);
            ApiError::from(e)
        })?;

    info!(
        "PDF processed in {:.2}s: {} characters, ~{} pages",
        started.elapsed().as_secs_f64(),
        document.content.chars().count(),
        document.page_count
    );
    Ok(Json(document))
}

/// `POST /api/generate-quiz`
pub async fn generate_quiz(
    State(state): State<ApiState>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Json<QuizResponse>, ApiError> {
    let Json(request) = body?;
    ensure_enough_content(&request.content, "quiz")?;
    if !(1..=MAX_QUESTIONS).contains(&request.num_questions) {
        return Err(ApiError::BadRequest(format!(
            "num_questions must be between 1 and {}",
            MAX_QUESTIONS
        )));
    }

    let content = truncate_chars(&request.content, API_MAX_CONTENT_CHARS);
    info!(
        "Generating {} questions from {} characters",
        request.num_questions,
        content.chars().count()
    );
    let started = Instant::now();

    let questions = state
        .generation
        .generate_quiz(content, request.num_questions as usize)
        .await
        .map_err(|e| ApiError::from_generation(e, "quiz"))?;

    info!(
        "Quiz generated in {:.2}s: {} questions",
        started.elapsed().as_secs_f64(),
        questions.len()
    );
    Ok(Json(QuizResponse { questions }))
}

/// `POST /api/generate-summary`
pub async fn generate_summary(
    State(state): State<ApiState>,
    body: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Json(request) = body?;
    ensure_enough_content(&request.content, "summary")?;

    let content = truncate_chars(&request.content, API_MAX_CONTENT_CHARS);
    info!("Generating summary from {} characters", content.chars().count());
    let started = Instant::now();

    let sections = state
        .generation
        .generate_summary(content)
        .await
        .map_err(|e| ApiError::from_generation(e, "summary"))?;

    info!(
        "Summary generated in {:.2}s: {} sections",
        started.elapsed().as_secs_f64(),
        sections.len()
    );
    Ok(Json(SummaryResponse { sections }))
}

fn ensure_enough_content(content: &str, kind: &str) -> Result<(), ApiError> {
    if content.trim().chars().count() < MIN_CONTENT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Content is too short to generate a {}",
            kind
        )));
    }
    Ok(())
}

/// Pull the `file` field out of a multipart body
async fn read_upload(mut multipart: Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        return Ok((file_name, data));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}
