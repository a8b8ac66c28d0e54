use anyhow::{Context, Result};
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::api::{self, ApiState};
use crate::app_config::{Config, ModelProvider};
use crate::errors::AppError;
use crate::generation::{GenerationService, UploadedDocument};
use crate::pdf_processor::{is_pdf_filename, PdfProcessor};
use crate::providers::ollama::Ollama;
use crate::providers::Provider;

// @module: Application controller wiring configuration, model and server

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Shared generation service
    generation: Arc<GenerationService>,
}

impl Controller {
    // @method: Create a controller backed by the configured provider
    pub fn with_config(config: Config) -> Result<Self> {
        let provider: Arc<dyn Provider> = match config.model.provider {
            ModelProvider::Ollama => Arc::new(
                Ollama::from_config(&config.model).context("Failed to create Ollama client")?,
            ),
        };
        Ok(Self::with_provider(config, provider))
    }

    /// Create a controller around an already built provider
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Self {
        let generation = Arc::new(GenerationService::new(provider, config.model.describe()));
        Self { config, generation }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared generation service
    pub fn generation(&self) -> Arc<GenerationService> {
        Arc::clone(&self.generation)
    }

    /// Handler state for the HTTP layer
    pub fn api_state(&self) -> ApiState {
        ApiState::new(self.generation())
    }

    /// Load the model; a failure is logged and leaves the service not ready
    pub async fn load_model(&self) -> bool {
        info!(
            "Loading model {} on {} via {}",
            self.config.model.name,
            self.config.model.device,
            self.config.model.provider.display_name()
        );
        match self.generation.load_model().await {
            Ok(()) => true,
            Err(e) => {
                error!("Model failed to load: {}", e);
                warn!("Serving without a model; generation endpoints will return 503");
                false
            }
        }
    }

    /// Load the model then serve HTTP until shutdown
    pub async fn run_server(&self) -> Result<()> {
        info!("Starting Qrayti API v{}", env!("CARGO_PKG_VERSION"));
        if self.config.server.debug {
            info!("Debug mode enabled");
        }
        self.load_model().await;
        api::serve(self.api_state(), &self.config.server).await
    }

    /// Extract a PDF from disk the same way the upload endpoint does
    pub fn extract_file(&self, path: &Path) -> Result<UploadedDocument, AppError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::File(format!("Not a file: {}", path.display())))?;

        if !is_pdf_filename(&file_name) {
            return Err(AppError::File(format!(
                "Only PDF files are allowed: {}",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;
        info!("Extracting {} ({} bytes)", path.display(), bytes.len());
        let document = PdfProcessor::new().process(&file_name, &bytes)?;
        Ok(document)
    }
}
