use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

/// Application configuration module
/// This module handles the service configuration: defaults, an optional
/// JSON config file, and environment variable overrides.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Text-generation model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Model runtime backing the generation service
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    // @provider: Ollama (local model server)
    #[default]
    Ollama,
}

impl ModelProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Compute device the model should run on
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Let the runtime decide
    #[default]
    Auto,
    /// Force CPU inference
    Cpu,
    /// Offload to the GPU
    #[serde(alias = "cuda")]
    Gpu,
}

impl std::str::FromStr for Device {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "gpu" | "cuda" => Ok(Self::Gpu),
            _ => Err(anyhow!("Invalid device: {} (expected auto, cpu or gpu)", s)),
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
        };
        write!(f, "{}", name)
    }
}

/// Text-generation model configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelConfig {
    /// Free-form label reported by the health endpoint (e.g. "local")
    #[serde(default = "default_model_type")]
    pub model_type: String,

    /// Runtime used to serve the model
    #[serde(default)]
    pub provider: ModelProvider,

    /// Model identifier as known by the runtime (e.g. "phi", "gemma:2b")
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Runtime endpoint URL
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,

    /// Device selection
    #[serde(default)]
    pub device: Device,

    /// Reduce memory usage at the cost of speed
    #[serde(default)]
    pub load_in_8bit: bool,

    /// Maximum generation length (context window in tokens)
    #[serde(default = "default_max_length")]
    pub max_length: u32,

    /// Temperature parameter for text generation (0.0 to 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: default_model_type(),
            provider: ModelProvider::default(),
            name: default_model_name(),
            endpoint: default_model_endpoint(),
            device: Device::default(),
            load_in_8bit: false,
            max_length: default_max_length(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ModelConfig {
    /// Label reported by the health endpoint, e.g. "local (phi)"
    pub fn describe(&self) -> String {
        format!("{} ({})", self.model_type, self.name)
    }
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Development mode
    #[serde(default = "default_true")]
    pub debug: bool,

    /// Comma-separated list of allowed cross-origin hosts, "*" for any
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: true,
            cors_origins: default_cors_origins(),
        }
    }
}

impl ServerConfig {
    /// Split the comma-separated origins into a list, skipping blanks
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Socket address string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

impl LogLevel {
    /// Convert to the `log` crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_model_type() -> String {
    "local".to_string()
}

fn default_model_name() -> String {
    "phi".to_string()
}

fn default_model_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_max_length() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    // CPU inference on small models routinely takes minutes
    300
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> String {
    "http://localhost:5173,http://localhost:3000".to_string()
}

fn default_true() -> bool {
    true
}

/// Parse a boolean the way environment files usually spell them
fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("Invalid boolean for {}: {}", key, value)),
    }
}

impl Config {
    /// Load a configuration from a JSON file; missing sections take defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Variable names match the ones the deployment scripts export
    /// (`LOCAL_MODEL_NAME`, `DEVICE`, `PORT`, ...). Unset variables leave the
    /// current value alone; malformed values are an error.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("MODEL_TYPE") {
            self.model.model_type = value;
        }
        if let Some(value) = lookup("MODEL_PROVIDER") {
            self.model.provider = value.parse()?;
        }
        if let Some(value) = lookup("LOCAL_MODEL_NAME") {
            self.model.name = value;
        }
        if let Some(value) = lookup("MODEL_ENDPOINT") {
            self.model.endpoint = value;
        }
        if let Some(value) = lookup("DEVICE") {
            self.model.device = value.parse()?;
        }
        if let Some(value) = lookup("LOAD_IN_8BIT") {
            self.model.load_in_8bit = parse_bool("LOAD_IN_8BIT", &value)?;
        }
        if let Some(value) = lookup("MAX_LENGTH") {
            self.model.max_length = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid MAX_LENGTH: {}", value))?;
        }
        if let Some(value) = lookup("TEMPERATURE") {
            self.model.temperature = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid TEMPERATURE: {}", value))?;
        }
        if let Some(value) = lookup("MODEL_TIMEOUT_SECS") {
            self.model.timeout_secs = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid MODEL_TIMEOUT_SECS: {}", value))?;
        }
        if let Some(value) = lookup("HOST") {
            self.server.host = value;
        }
        if let Some(value) = lookup("PORT") {
            self.server.port = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT: {}", value))?;
        }
        if let Some(value) = lookup("DEBUG") {
            self.server.debug = parse_bool("DEBUG", &value)?;
        }
        if let Some(value) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = value;
        }
        if let Some(value) = lookup("LOG_LEVEL") {
            self.log_level = value.parse()?;
        }
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.model.name.trim().is_empty() {
            return Err(anyhow!("Model name must not be empty"));
        }

        if self.model.endpoint.trim().is_empty() {
            return Err(anyhow!("Model endpoint must not be empty"));
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.model.temperature
            ));
        }

        if self.model.max_length == 0 {
            return Err(anyhow!("Max generation length must be greater than zero"));
        }

        if self.server.port == 0 {
            return Err(anyhow!("Server port must be greater than zero"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            model: ModelConfig::default(),
            server: ServerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
