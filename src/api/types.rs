//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::generation::{GenerationService, QuizQuestion, SummarySection};
use crate::pdf_processor::PdfProcessor;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct ApiState {
    /// Generation service, shared by every request
    pub generation: Arc<GenerationService>,
    /// PDF extractor
    pub pdf: PdfProcessor,
}

impl ApiState {
    pub fn new(generation: Arc<GenerationService>) -> Self {
        Self {
            generation,
            pdf: PdfProcessor::new(),
        }
    }
}

fn default_num_questions() -> i64 {
    5
}

/// Body of `POST /api/generate-quiz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRequest {
    pub content: String,
    /// Signed so that negative values reach validation instead of failing deserialization
    #[serde(default = "default_num_questions")]
    pub num_questions: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
}

/// Body of `POST /api/generate-summary`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub sections: Vec<SummarySection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" once the model is loaded, "initializing" otherwise
    pub status: String,
    pub model_type: String,
    pub model_ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub docs: String,
}

/// Error body, `{"detail": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
