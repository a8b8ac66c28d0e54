use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::app_config::{Device, ModelConfig};
use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionRequest, Provider};

/// How long the runtime keeps the model resident between requests
const KEEP_ALIVE: &str = "30m";

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model name to use for generation
    model: String,
    /// Sampling and placement options applied to every request
    options: GenerationOptions,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    /// How long to keep the model loaded in memory
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
}

/// Generation options for the Ollama API
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Top-p sampling (default: 0.9)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Penalty applied to repeated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    /// Context window size in tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    /// Number of layers offloaded to the GPU (0 forces CPU)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_gpu: Option<i32>,
    /// Trade speed for lower memory usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_vram: Option<bool>,
}

impl GenerationOptions {
    /// Map the service model settings onto Ollama options
    pub fn from_model_config(config: &ModelConfig) -> Self {
        let num_gpu = match config.device {
            Device::Auto => None,
            Device::Cpu => Some(0),
            // Ollama caps this at the model's layer count
            Device::Gpu => Some(999),
        };

        Self {
            temperature: Some(config.temperature),
            top_p: Some(0.9),
            repeat_penalty: Some(1.1),
            num_predict: None,
            num_ctx: Some(config.max_length),
            num_gpu,
            low_vram: config.load_in_8bit.then_some(true),
        }
    }
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    pub model: String,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    pub done: bool,
    /// Total duration of the request in nanoseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    /// Duration of loading the model in nanoseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ModelRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Builder methods for GenerationRequest
impl GenerationRequest {
    /// Create a new generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            options: None,
            stream: Some(false),
            keep_alive: None,
        }
    }

    /// Set all generation options at once
    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the keep-alive duration
    pub fn keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }

    /// Model this request targets
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Options attached to this request
    pub fn generation_options(&self) -> Option<&GenerationOptions> {
        self.options.as_ref()
    }
}

/// Normalize an endpoint string into a base URL without trailing slash
pub fn normalize_endpoint(endpoint: &str) -> Result<String, ProviderError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(ProviderError::ConnectionError("Endpoint cannot be empty".to_string()));
    }

    let candidate = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| ProviderError::ConnectionError(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

    if url.host_str().is_none() {
        return Err(ProviderError::ConnectionError(format!("Invalid host in endpoint: {}", endpoint)));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Decode the body of a non-streaming generate call
///
/// Some Ollama versions ignore `stream: false` behind proxies and answer in
/// JSONL; in that case the pieces are concatenated.
pub fn parse_generation_body(body: &str) -> Result<GenerationResponse, ProviderError> {
    if let Ok(response) = serde_json::from_str::<GenerationResponse>(body) {
        return Ok(response);
    }

    let lines: Vec<&str> = body.lines().filter(|line| !line.trim().is_empty()).collect();
    let mut pieces = Vec::new();
    let mut model = String::from("unknown");
    let mut created_at = String::new();
    let mut prompt_eval_count = None;
    let mut eval_count = None;
    let mut saw_done = false;

    for line in &lines {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };
        if let Some(part) = value.get("response").and_then(|v| v.as_str()) {
            pieces.push(part.to_string());
        }
        if let Some(name) = value.get("model").and_then(|v| v.as_str()) {
            model = name.to_string();
        }
        if value.get("done").and_then(|v| v.as_bool()).unwrap_or(false) {
            saw_done = true;
            created_at = value.get("created_at").and_then(|v| v.as_str()).unwrap_or("").to_string();
            prompt_eval_count = value.get("prompt_eval_count").and_then(|v| v.as_u64());
            eval_count = value.get("eval_count").and_then(|v| v.as_u64());
        }
    }

    if pieces.is_empty() && !saw_done {
        let preview: String = body.chars().take(500).collect();
        error!("Failed to parse Ollama API response. Raw response (first 500 chars): {}", preview);
        return Err(ProviderError::ParseError(
            "Response contains no generation payload".to_string(),
        ));
    }

    Ok(GenerationResponse {
        model,
        created_at,
        response: pieces.concat(),
        done: true,
        total_duration: None,
        load_duration: None,
        prompt_eval_count,
        eval_count,
    })
}

/// Pull the `error` field out of an Ollama error body when present
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

impl Ollama {
    /// Create a new Ollama client from a complete URL
    pub fn from_url(url: &str, model: impl Into<String>, timeout_secs: u64) -> Result<Self, ProviderError> {
        let base_url = normalize_endpoint(url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            // Ollama uses HTTP/1.1
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            client,
            model: model.into(),
            options: GenerationOptions::default(),
        })
    }

    /// Create a new Ollama client from the service model configuration
    pub fn from_config(config: &ModelConfig) -> Result<Self, ProviderError> {
        let mut ollama = Self::from_url(&config.endpoint, config.name.clone(), config.timeout_secs)?;
        ollama.options = GenerationOptions::from_model_config(config);
        Ok(ollama)
    }

    /// Generate text from the Ollama API
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to send request to Ollama API: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to get response text from Ollama API: {}", e)))?;

        if !status.is_success() {
            let message = error_message(&body);
            error!("Ollama API error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        parse_generation_body(&body)
    }

    /// Check whether the model is already present on the server
    pub async fn has_model(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/api/show", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ModelRequest { name: &self.model, stream: None })
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to connect to Ollama: {}", e)))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ProviderError::ApiError {
                    status_code: status.as_u16(),
                    message: error_message(&body),
                })
            }
        }
    }

    /// Download the model onto the server
    pub async fn pull_model(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/pull", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ModelRequest { name: &self.model, stream: Some(false) })
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to connect to Ollama: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ModelUnavailable(format!(
                "Failed to pull model {} ({}): {}",
                self.model,
                status,
                error_message(&body)
            )));
        }
        Ok(())
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to connect to Ollama: {}", e)))?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama version response: {}", e)))?;

        response["version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }

    fn request_for(&self, request: &CompletionRequest) -> GenerationRequest {
        let mut options = self.options.clone();
        options.num_predict = Some(request.max_new_tokens);
        GenerationRequest::new(self.model.clone(), request.prompt.clone())
            .options(options)
            .keep_alive(KEEP_ALIVE)
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn load_model(&self) -> Result<(), ProviderError> {
        match self.version().await {
            Ok(version) => info!("Connected to Ollama {} at {}", version, self.base_url),
            Err(e) => {
                return Err(ProviderError::ConnectionError(format!(
                    "Ollama is not reachable at {}: {}",
                    self.base_url, e
                )));
            }
        }

        if !self.has_model().await? {
            warn!("Model {} not found locally, pulling it (this may take a few minutes)...", self.model);
            self.pull_model().await?;
        }

        // An empty prompt makes Ollama load the weights without generating
        let warm_up = GenerationRequest::new(self.model.clone(), "")
            .options(self.options.clone())
            .keep_alive(KEEP_ALIVE);
        self.generate(warm_up).await?;
        debug!("Model {} is resident", self.model);
        Ok(())
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let response = self.generate(self.request_for(&request)).await?;
        Ok(Completion {
            text: response.response.trim().to_string(),
            prompt_tokens: response.prompt_eval_count,
            completion_tokens: response.eval_count,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
