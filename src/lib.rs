/*!
 * # Qrayti - study aids from course material
 *
 * An HTTP service that turns PDFs and pasted text into multiple-choice
 * quizzes and structured summaries in French, with explanations and
 * definitions transliterated into Moroccan Darija.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration from defaults, a JSON file and the environment
 * - `pdf_processor`: Text extraction and cleanup for uploaded PDFs
 * - `generation`: Quiz and summary generation:
 *   - `generation::core`: The service, readiness and the single retry
 *   - `generation::parsing`: JSON extraction from model output
 *   - `generation::prompts`: Prompt templates and truncation budgets
 *   - `generation::model`: Quiz, summary and document records
 * - `providers`: Text-generation runtimes:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Scripted provider for tests
 * - `api`: axum routes, request validation and error mapping
 * - `app_controller`: Wires configuration, model and server together
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod api;
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod generation;
pub mod pdf_processor;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ExtractionError, GenerationError, ProviderError};
pub use generation::{GenerationService, KeyTerm, QuizQuestion, SummarySection, UploadedDocument};
pub use pdf_processor::PdfProcessor;
