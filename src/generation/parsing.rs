/*!
 * Extraction of JSON payloads from free-form model output.
 *
 * Small models rarely return clean JSON. The extraction tries, in order:
 * 1. a fenced code block tagged `json`
 * 2. the span from the first `{` to the last `}`
 * 3. the whole text
 *
 * The first candidate that parses as a JSON object wins.
 */

use serde_json::{Map, Value};
use thiserror::Error;

use super::model::{QuizQuestion, RawQuizQuestion, RawSummarySection, SummarySection};

/// Why a generation could not be turned into a payload
#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    /// None of the extraction strategies produced a JSON object
    #[error("Could not parse JSON from model output")]
    NoJson,

    /// A JSON object was found but the expected array is absent
    #[error("Model output has no \"{0}\" array")]
    MissingField(&'static str),

    /// The array was present but nothing in it was usable
    #[error("Model output contains no valid {0}")]
    Empty(&'static str),
}

/// Contents of the first ```json fenced block, if any
fn fenced_json_block(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let end = text[start..].find("```")?;
    Some(text[start..start + end].trim())
}

/// Span from the first `{` to the last `}`
fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Extract the first JSON object from model output following the parse policy
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    fenced_json_block(text)
        .and_then(parse_object)
        .or_else(|| outer_braces(text).and_then(parse_object))
        .or_else(|| parse_object(text.trim()))
}

fn take_array(mut object: Map<String, Value>, field: &'static str) -> Result<Vec<Value>, ParseError> {
    match object.remove(field) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(ParseError::MissingField(field)),
    }
}

/// Parse quiz questions out of model output
///
/// Unusable questions are dropped; ids are left at zero for the caller to
/// assign.
pub fn parse_quiz(text: &str) -> Result<Vec<QuizQuestion>, ParseError> {
    let object = extract_json_object(text).ok_or(ParseError::NoJson)?;
    let questions: Vec<QuizQuestion> = take_array(object, "questions")?
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawQuizQuestion>(item).ok())
        .filter_map(RawQuizQuestion::into_question)
        .collect();

    if questions.is_empty() {
        return Err(ParseError::Empty("questions"));
    }
    Ok(questions)
}

/// Parse summary sections out of model output
pub fn parse_summary(text: &str) -> Result<Vec<SummarySection>, ParseError> {
    let object = extract_json_object(text).ok_or(ParseError::NoJson)?;
    let sections: Vec<SummarySection> = take_array(object, "sections")?
        .into_iter()
        .filter_map(|item| serde_json::from_value::<RawSummarySection>(item).ok())
        .filter_map(RawSummarySection::into_section)
        .collect();

    if sections.is_empty() {
        return Err(ParseError::Empty("sections"));
    }
    Ok(sections)
}
