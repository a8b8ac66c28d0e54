/*!
 * Quiz and summary generation using a text-generation model.
 *
 * - `core`: The generation service and its single-retry contract
 * - `model`: Quiz, summary and upload records
 * - `parsing`: JSON extraction from free-form model output
 * - `prompts`: Prompt templates and truncation budgets
 */

// Re-export main types for easier usage
pub use self::core::GenerationService;
pub use self::model::{KeyTerm, QuizQuestion, SummarySection, UploadedDocument};
pub use self::parsing::{extract_json_object, parse_quiz, parse_summary, ParseError};

// Submodules
pub mod core;
pub mod model;
pub mod parsing;
pub mod prompts;
