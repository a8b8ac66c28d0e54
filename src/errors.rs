/*!
 * Error types for the qrayti service.
 *
 * This module contains custom error types for the different layers of the
 * service, using the thiserror crate for ergonomic error definitions.
 * HTTP mapping of these errors lives in `api::error`.
 */

use thiserror::Error;

/// Errors that can occur when talking to the text-generation runtime
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The requested model is not available and could not be fetched
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
}

/// Errors that can occur while pulling text out of an uploaded PDF
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The byte buffer could not be loaded as a PDF document
    #[error("Failed to extract text from PDF: {0}")]
    Malformed(String),

    /// The document loaded but no page yielded any text
    #[error("No text could be extracted from the PDF. The PDF might be image-based or encrypted.")]
    NoText,

    /// Some text came out, but not enough to work with
    #[error("Could not extract sufficient text from PDF. Please ensure the PDF contains readable text, not just images.")]
    InsufficientText {
        /// Number of characters that were recovered
        chars: usize,
    },
}

impl ExtractionError {
    /// Whether the failure is caused by the document content rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NoText | Self::InsufficientText { .. })
    }
}

/// Errors that can occur during quiz or summary generation
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The model never finished loading
    #[error("Model not loaded")]
    ModelNotReady,

    /// Error from the provider while loading the model
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Both the primary attempt and the retry failed
    #[error("{message}")]
    Exhausted {
        /// Description of the last failure
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from PDF extraction
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

// Utility functions for error conversion
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
