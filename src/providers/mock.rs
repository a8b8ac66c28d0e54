/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::scripted()` - Replays canned model outputs in order
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty()` - Always returns an empty generation
 * - `MockProvider::unloadable()` - Cannot load its model
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionRequest, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Replays the scripted outputs
    Scripted,
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Replays the scripted outputs after a delay
    Slow { delay_ms: u64 },
}

/// Mock provider for testing generation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Outputs returned in order; the last one repeats once exhausted
    script: Arc<Vec<String>>,
    /// Whether `load_model` fails
    fail_load: bool,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request seen, shared between clones
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior and script
    pub fn new(behavior: MockBehavior, script: Vec<String>) -> Self {
        Self {
            behavior,
            script: Arc::new(script),
            fail_load: false,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that replays the given outputs in order
    pub fn scripted<I, S>(outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            MockBehavior::Scripted,
            outputs.into_iter().map(Into::into).collect(),
        )
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing, Vec::new())
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty, Vec::new())
    }

    /// Create a mock whose model never loads
    pub fn unloadable() -> Self {
        let mut provider = Self::failing();
        provider.fail_load = true;
        provider
    }

    /// Create a slow mock that replays the given outputs
    pub fn slow<I, S>(delay_ms: u64, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            MockBehavior::Slow { delay_ms },
            outputs.into_iter().map(Into::into).collect(),
        )
    }

    /// Number of `complete` calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every request received
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Build a well-formed quiz payload with `count` questions
    pub fn quiz_payload(count: usize) -> String {
        let questions: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "id": 100 + i,
                    "question": format!("Question {}?", i + 1),
                    "options": ["A", "B", "C", "D"],
                    "correctIndex": i % 4,
                    "explanation": format!("Explication {}", i + 1),
                    "explanationDarija": format!("Charh {}", i + 1),
                })
            })
            .collect();
        serde_json::json!({ "questions": questions }).to_string()
    }

    /// Build a well-formed summary payload with `count` sections
    pub fn summary_payload(count: usize) -> String {
        let sections: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "title": format!("Section {}", i + 1),
                    "content": "Contenu de la section.",
                    "keyTerms": [{
                        "term": "Contrat",
                        "definition": "Accord de volontés",
                        "definitionDarija": "Ittifaq bin jouj",
                    }],
                    "essentialPoints": ["Point essentiel"],
                })
            })
            .collect();
        serde_json::json!({ "sections": sections }).to_string()
    }

    fn next_scripted(&self, index: usize) -> String {
        self.script
            .get(index)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or_default()
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            script: Arc::clone(&self.script),
            fail_load: self.fail_load,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn load_model(&self) -> Result<(), ProviderError> {
        if self.fail_load {
            return Err(ProviderError::ModelUnavailable(
                "Simulated model load failure".to_string(),
            ));
        }
        Ok(())
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }

        match self.behavior {
            MockBehavior::Scripted => {
                let text = self.next_scripted(count);
                Ok(Completion {
                    completion_tokens: Some((text.len() / 4) as u64),
                    prompt_tokens: Some((request.prompt.len() / 4) as u64),
                    text,
                })
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(Completion {
                text: String::new(),
                prompt_tokens: Some(0),
                completion_tokens: Some(0),
            }),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Completion {
                    text: self.next_scripted(count),
                    prompt_tokens: None,
                    completion_tokens: None,
                })
            }
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
