/*!
 * Study material data model.
 *
 * Output records returned to clients, plus the lenient "raw" shapes used to
 * read whatever the model produced before it is normalized.
 */

use log::warn;
use serde::{Deserialize, Serialize};

/// A multiple-choice question with bilingual explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// 1-based position in the quiz
    pub id: usize,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub correct_index: usize,
    /// Explanation in French
    pub explanation: String,
    /// Explanation in Darija (Latin transliteration)
    pub explanation_darija: String,
}

impl QuizQuestion {
    /// Text of the correct option.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

/// A term and its definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyTerm {
    pub term: String,
    pub definition: String,
    pub definition_darija: String,
}

/// One section of a structured summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySection {
    pub title: String,
    pub content: String,
    pub key_terms: Vec<KeyTerm>,
    pub essential_points: Vec<String>,
}

/// Text extracted from an upload. Lives for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub file_name: String,
    pub content: String,
    pub page_count: usize,
}

/// Question as emitted by the model; every field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawQuizQuestion {
    question: String,
    options: Vec<serde_json::Value>,
    correct_index: Option<i64>,
    explanation: String,
    explanation_darija: Option<String>,
}

impl RawQuizQuestion {
    /// Validate and normalize; `None` when the question is unusable.
    ///
    /// The id is a placeholder here and is assigned by the caller.
    pub(crate) fn into_question(self) -> Option<QuizQuestion> {
        let options: Vec<String> = self
            .options
            .into_iter()
            .map(|value| match value {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            })
            .collect();

        if self.question.trim().is_empty() || options.len() < 2 {
            warn!("Dropping question without text or with fewer than two options");
            return None;
        }

        let correct_index = match self.correct_index {
            Some(index) if index >= 0 && (index as usize) < options.len() => index as usize,
            other => {
                warn!(
                    "Dropping question with correctIndex {:?} outside 0..{}",
                    other,
                    options.len()
                );
                return None;
            }
        };

        let explanation_darija = match self.explanation_darija {
            Some(text) if !text.trim().is_empty() => text,
            _ => self.explanation.clone(),
        };

        Some(QuizQuestion {
            id: 0,
            question: self.question,
            options,
            correct_index,
            explanation: self.explanation,
            explanation_darija,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawKeyTerm {
    term: String,
    definition: String,
    definition_darija: Option<String>,
}

impl From<RawKeyTerm> for KeyTerm {
    fn from(raw: RawKeyTerm) -> Self {
        let definition_darija = match raw.definition_darija {
            Some(text) if !text.trim().is_empty() => text,
            _ => raw.definition.clone(),
        };
        KeyTerm {
            term: raw.term,
            definition: raw.definition,
            definition_darija,
        }
    }
}

/// Section as emitted by the model.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawSummarySection {
    title: String,
    content: String,
    key_terms: Vec<RawKeyTerm>,
    essential_points: Vec<String>,
}

impl RawSummarySection {
    pub(crate) fn into_section(self) -> Option<SummarySection> {
        if self.title.trim().is_empty() && self.content.trim().is_empty() {
            warn!("Dropping summary section without title or content");
            return None;
        }
        Some(SummarySection {
            title: self.title,
            content: self.content,
            key_terms: self.key_terms.into_iter().map(KeyTerm::from).collect(),
            essential_points: self.essential_points,
        })
    }
}
