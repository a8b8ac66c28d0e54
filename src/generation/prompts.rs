/*!
 * Prompt templates for quiz and summary generation.
 *
 * Each template has a primary form carrying a one-item JSON example and a
 * shorter retry form without it.
 */

/// Characters of content kept when building a prompt
pub const PROMPT_CONTENT_CHARS: usize = 300;

/// Characters of content kept in the retry prompt
pub const RETRY_CONTENT_CHARS: usize = 200;

/// Token budgets for one kind of generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    pub primary: u32,
    pub retry: u32,
}

/// Budget for quiz generation
pub const QUIZ_BUDGET: TokenBudget = TokenBudget { primary: 400, retry: 300 };

/// Budget for summary generation
pub const SUMMARY_BUDGET: TokenBudget = TokenBudget { primary: 300, retry: 250 };

const QUIZ_EXAMPLE: &str = r#"{"questions":[{"id":1,"question":"Q?","options":["A","B","C","D"],"correctIndex":0,"explanation":"E","explanationDarija":"D"}]}"#;

const SUMMARY_EXAMPLE: &str = r#"{"sections":[{"title":"T","content":"C","keyTerms":[{"term":"T","definition":"D","definitionDarija":"DD"}],"essentialPoints":["P1"]}]}"#;

/// Longest prefix of `text` holding at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Cut content to the prompt budget, marking the cut with an ellipsis
pub fn prepare_content(content: &str) -> String {
    let truncated = truncate_chars(content, PROMPT_CONTENT_CHARS);
    if truncated.len() < content.len() {
        format!("{}...", truncated)
    } else {
        content.to_string()
    }
}

/// Primary quiz prompt
pub fn quiz_prompt(content: &str, num_questions: usize) -> String {
    format!(
        "Crée {} questions:\n\n{}\n\nJSON:{}",
        num_questions, content, QUIZ_EXAMPLE
    )
}

/// Shorter quiz prompt used for the single retry
pub fn quiz_retry_prompt(content: &str, num_questions: usize) -> String {
    format!(
        "Crée {} questions sur: {}\nJSON:",
        num_questions,
        truncate_chars(content, RETRY_CONTENT_CHARS)
    )
}

/// Primary summary prompt
pub fn summary_prompt(content: &str) -> String {
    format!("Résume:\n\n{}\n\nJSON:{}", content, SUMMARY_EXAMPLE)
}

/// Shorter summary prompt used for the single retry
pub fn summary_retry_prompt(content: &str) -> String {
    format!("Résume: {}\nJSON:", truncate_chars(content, RETRY_CONTENT_CHARS))
}
