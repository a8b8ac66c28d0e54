/*!
 * Provider implementations for text-generation runtimes.
 *
 * This module contains client implementations for the runtimes that can back
 * the generation service:
 * - Ollama: Local LLM server
 * - Mock: Scripted provider for tests and offline development
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A single generation request, independent of the runtime
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Full prompt text
    pub prompt: String,
    /// Upper bound on generated tokens
    pub max_new_tokens: u32,
}

impl CompletionRequest {
    /// Create a new completion request
    pub fn new(prompt: impl Into<String>, max_new_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_new_tokens,
        }
    }
}

/// Generated text plus token accounting when the runtime reports it
#[derive(Debug, Clone, Default)]
pub struct Completion {
    /// Generated text, without the prompt
    pub text: String,
    /// Number of prompt tokens
    pub prompt_tokens: Option<u64>,
    /// Number of generated tokens
    pub completion_tokens: Option<u64>,
}

/// Common trait for all text-generation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably behind the generation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Make the model available for generation
    ///
    /// Called once at startup. A failure leaves the generation service
    /// permanently not ready.
    async fn load_model(&self) -> Result<(), ProviderError>;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Completion, ProviderError>` - The generated text or an error
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    /// Model identifier used by this provider
    fn model_name(&self) -> &str;
}

pub mod mock;
pub mod ollama;
