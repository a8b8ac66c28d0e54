/*!
 * Core generation service implementation.
 *
 * `GenerationService` owns the single shared provider handle. Every
 * operation follows the same contract: truncate, prompt, generate, parse, and
 * on failure retry exactly once with a shorter prompt and a smaller token
 * budget. A second failure is returned to the caller; nothing is invented.
 */

use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::model::{QuizQuestion, SummarySection};
use super::parsing::{self, ParseError};
use super::prompts::{self, QUIZ_BUDGET, SUMMARY_BUDGET};
use crate::errors::GenerationError;
use crate::providers::{CompletionRequest, Provider};

const STATE_LOADING: u8 = 0;
const STATE_READY: u8 = 1;
const STATE_FAILED: u8 = 2;

/// Quiz and summary generation over a shared text-generation model
#[derive(Debug)]
pub struct GenerationService {
    /// Provider implementation
    provider: Arc<dyn Provider>,

    /// Load state; moves away from LOADING at most once
    state: AtomicU8,

    /// Human-readable model label, e.g. "local (phi)"
    description: String,
}

impl GenerationService {
    /// Create a service around a provider; the model is not loaded yet
    pub fn new(provider: Arc<dyn Provider>, description: impl Into<String>) -> Self {
        Self {
            provider,
            state: AtomicU8::new(STATE_LOADING),
            description: description.into(),
        }
    }

    /// Load the model through the provider
    ///
    /// Only the first call does any work. A failed load leaves the service
    /// permanently not ready.
    pub async fn load_model(&self) -> Result<(), GenerationError> {
        match self.state.load(Ordering::Acquire) {
            STATE_READY => return Ok(()),
            STATE_FAILED => return Err(GenerationError::ModelNotReady),
            _ => {}
        }

        info!("Loading model: {}", self.provider.model_name());
        let started = Instant::now();
        match self.provider.load_model().await {
            Ok(()) => {
                self.state.store(STATE_READY, Ordering::Release);
                info!(
                    "Model loaded successfully: {} ({:.2}s)",
                    self.provider.model_name(),
                    started.elapsed().as_secs_f64()
                );
                Ok(())
            }
            Err(e) => {
                self.state.store(STATE_FAILED, Ordering::Release);
                error!("Error loading model {}: {}", self.provider.model_name(), e);
                Err(GenerationError::Provider(e))
            }
        }
    }

    /// Whether the model finished loading
    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_READY
    }

    /// Label of the backing model
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Generate `num_questions` multiple-choice questions from `content`
    ///
    /// Returned ids always run 1..=N regardless of what the model emitted.
    pub async fn generate_quiz(
        &self,
        content: &str,
        num_questions: usize,
    ) -> Result<Vec<QuizQuestion>, GenerationError> {
        self.ensure_ready()?;

        let content = prompts::prepare_content(content);
        info!(
            "Generating {} quiz questions from {} characters...",
            num_questions,
            content.chars().count()
        );

        let primary = CompletionRequest::new(prompts::quiz_prompt(&content, num_questions), QUIZ_BUDGET.primary);
        let retry = CompletionRequest::new(
            prompts::quiz_retry_prompt(&content, num_questions),
            QUIZ_BUDGET.retry,
        );

        let questions = self
            .generate_with_retry("quiz", primary, retry, parsing::parse_quiz)
            .await?;

        let questions = number_questions(questions, num_questions);
        info!("Generated {} questions", questions.len());
        Ok(questions)
    }

    /// Generate a structured summary of `content`
    pub async fn generate_summary(&self, content: &str) -> Result<Vec<SummarySection>, GenerationError> {
        self.ensure_ready()?;

        let content = prompts::prepare_content(content);
        info!("Generating summary from {} characters...", content.chars().count());

        let primary = CompletionRequest::new(prompts::summary_prompt(&content), SUMMARY_BUDGET.primary);
        let retry = CompletionRequest::new(prompts::summary_retry_prompt(&content), SUMMARY_BUDGET.retry);

        let sections = self
            .generate_with_retry("summary", primary, retry, parsing::parse_summary)
            .await?;

        info!("Generated {} summary sections", sections.len());
        Ok(sections)
    }

    fn ensure_ready(&self) -> Result<(), GenerationError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(GenerationError::ModelNotReady)
        }
    }

    async fn generate_with_retry<T>(
        &self,
        kind: &str,
        primary: CompletionRequest,
        retry: CompletionRequest,
        parse: fn(&str) -> Result<T, ParseError>,
    ) -> Result<T, GenerationError> {
        match self.attempt(primary, parse).await {
            Ok(value) => return Ok(value),
            Err(reason) => warn!("{}; retrying {} with shorter prompt", reason, kind),
        }

        self.attempt(retry, parse).await.map_err(|reason| {
            error!("Error generating {}: {}", kind, reason);
            GenerationError::Exhausted {
                message: format!("Failed to generate valid {} after retry: {}", kind, reason),
            }
        })
    }

    async fn attempt<T>(
        &self,
        request: CompletionRequest,
        parse: fn(&str) -> Result<T, ParseError>,
    ) -> Result<T, String> {
        info!(
            "Generating text, prompt length: {}, max_tokens: {}",
            request.prompt.chars().count(),
            request.max_new_tokens
        );
        let started = Instant::now();
        let completion = self
            .provider
            .complete(request)
            .await
            .map_err(|e| e.to_string())?;
        info!(
            "Text generation took {:.2} seconds, generated {} characters",
            started.elapsed().as_secs_f64(),
            completion.text.chars().count()
        );
        if let (Some(prompt_tokens), Some(completion_tokens)) =
            (completion.prompt_tokens, completion.completion_tokens)
        {
            debug!(
                "Token usage: {} prompt, {} generated",
                prompt_tokens, completion_tokens
            );
        }

        parse(&completion.text).map_err(|e| e.to_string())
    }
}

/// Keep at most `limit` questions and renumber them from 1
fn number_questions(questions: Vec<QuizQuestion>, limit: usize) -> Vec<QuizQuestion> {
    questions
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, mut question)| {
            question.id = index + 1;
            question
        })
        .collect()
}
