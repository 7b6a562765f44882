use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
///
/// Built once at startup and handed to the composition root; business logic
/// never reads the process environment directly.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// State backend configuration
    #[serde(default)]
    pub state: StateConfig,

    /// Embedding configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Advisory service configuration
    #[serde(default)]
    pub advisory: AdvisoryConfig,

    /// Feature flags
    #[serde(default)]
    pub features: FeatureFlags,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: INCIDENT_COPILOT_)
            .add_source(
                config::Environment::with_prefix("INCIDENT_COPILOT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("features.cors_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// State backend type
    #[serde(default)]
    pub backend: StateBackend,

    /// Path for embedded database (sled)
    pub path: Option<PathBuf>,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: StateBackend::default(),
            path: Some(PathBuf::from("./data/state")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StateBackend {
    Memory,
    #[default]
    Sled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Vector dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Input is truncated to this many characters before tokenizing
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Embedding mode when no external embedding provider is configured
    #[serde(default)]
    pub fallback: EmbeddingFallback,

    /// Pause after this many items during a rebuild
    #[serde(default = "default_rebuild_batch_size")]
    pub rebuild_batch_size: usize,

    /// Pause length (milliseconds)
    #[serde(default = "default_rebuild_pause_ms")]
    pub rebuild_pause_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            max_input_chars: default_max_input_chars(),
            fallback: EmbeddingFallback::default(),
            rebuild_batch_size: default_rebuild_batch_size(),
            rebuild_pause_ms: default_rebuild_pause_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingFallback {
    /// Deterministic local hashing vectorizer
    #[default]
    Local,
    /// Embeddings disabled
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    /// Call the advisory service at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the advisory service
    #[serde(default = "default_advisory_base_url")]
    pub base_url: String,

    /// Per-call timeout (seconds)
    #[serde(default = "default_advisory_timeout")]
    pub timeout_secs: u64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_advisory_base_url(),
            timeout_secs: default_advisory_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeatureFlags {
    /// Allow status updates over the API
    #[serde(default)]
    pub allow_status_patch: bool,

    /// CORS allow-list; empty disables CORS
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3001
}

fn default_request_timeout() -> u64 {
    30
}

fn default_dimension() -> usize {
    crate::embedding::DEFAULT_DIMENSION
}

fn default_max_input_chars() -> usize {
    crate::embedding::MAX_INPUT_CHARS
}

fn default_rebuild_batch_size() -> usize {
    25
}

fn default_rebuild_pause_ms() -> u64 {
    250
}

fn default_advisory_base_url() -> String {
    "http://ai:8000".to_string()
}

fn default_advisory_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "incident-copilot".to_string()
}

fn default_true() -> bool {
    true
}
