//! Pipeline configuration.
//!
//! Every component receives an explicit configuration section instead of
//! reading module-level constants. Configuration is loaded from a TOML file
//! (`kiln.toml`) with environment-variable overrides for the remote
//! endpoints.
//!
//! Precedence:
//! 1. CLI arguments (handled by clap)
//! 2. Environment variables (`KILN_*`)
//! 3. Config file (`./kiln.toml` or an explicit path)
//! 4. Defaults

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("failed to read configuration file: {0}")]
    Read(String),

    /// Failed to parse configuration file.
    #[error("failed to parse configuration file: {0}")]
    Parse(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Object storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the object store.
    #[serde(default = "default_store_url")]
    pub base_url: String,
    /// Bucket that holds dataset shards and model artifacts.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Key prefix under which all pipeline objects live.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

/// Training backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Base URL of the managed training service.
    #[serde(default = "default_training_url")]
    pub base_url: String,
    /// Region the jobs run in.
    #[serde(default = "default_region")]
    pub region: String,
    /// Execution role passed to the training service, if it requires one.
    #[serde(default)]
    pub role: Option<String>,
    /// Instance type training jobs run on.
    #[serde(default = "default_training_instance_type")]
    pub instance_type: String,
    /// Storage location where the service writes model artifacts.
    #[serde(default = "default_output_location")]
    pub output_location: String,
    /// Seconds between job status polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

/// Hosting service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostingConfig {
    /// Base URL of the hosting service.
    #[serde(default = "default_hosting_url")]
    pub base_url: String,
    /// Instance type for serving endpoints.
    #[serde(default = "default_instance_type")]
    pub instance_type: String,
    /// Number of instances behind a new endpoint.
    #[serde(default = "default_instance_count")]
    pub initial_instance_count: u32,
}

/// Scoring endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Base URL of the endpoint invocation service.
    #[serde(default = "default_hosting_url")]
    pub base_url: String,
    /// Content-type tag sent with raw-text payloads.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    /// Number of records per invocation.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Root configuration for the pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Object storage configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Training backend configuration.
    #[serde(default)]
    pub training: TrainingConfig,
    /// Hosting service configuration.
    #[serde(default)]
    pub hosting: HostingConfig,
    /// Scoring endpoint configuration.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

fn default_store_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_bucket() -> String {
    "kiln-data".to_string()
}

fn default_prefix() -> String {
    "digits".to_string()
}

fn default_training_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_hosting_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_output_location() -> String {
    "kiln-data/digits/output".to_string()
}

fn default_poll_interval() -> u64 {
    15
}

fn default_training_instance_type() -> String {
    "standard.large".to_string()
}

fn default_instance_type() -> String {
    "standard.medium".to_string()
}

fn default_instance_count() -> u32 {
    1
}

fn default_content_type() -> String {
    "application/x-recordio-text".to_string()
}

fn default_batch_size() -> usize {
    100
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_url(),
            bucket: default_bucket(),
            prefix: default_prefix(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            base_url: default_training_url(),
            region: default_region(),
            role: None,
            instance_type: default_training_instance_type(),
            output_location: default_output_location(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            base_url: default_hosting_url(),
            instance_type: default_instance_type(),
            initial_instance_count: default_instance_count(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_url: default_hosting_url(),
            content_type: default_content_type(),
            batch_size: default_batch_size(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("failed to serialize: {e}")))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Read(format!("failed to create directory: {e}")))?;
        }

        std::fs::write(path, content)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Load `./kiln.toml` if present, otherwise defaults, then apply
    /// environment overrides.
    pub fn discover_and_load() -> ConfigResult<Self> {
        let local = Path::new("kiln.toml");
        let mut config =
            if local.exists() { Self::load_from_file(local)? } else { Self::default() };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override remote endpoints and the bucket from `KILN_*` environment
    /// variables.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("KILN_STORE_URL") {
            self.store.base_url = url;
        }
        if let Ok(bucket) = std::env::var("KILN_BUCKET") {
            self.store.bucket = bucket;
        }
        if let Ok(url) = std::env::var("KILN_TRAINING_URL") {
            self.training.base_url = url;
        }
        if let Ok(url) = std::env::var("KILN_HOSTING_URL") {
            self.hosting.base_url = url;
            self.scoring.base_url = self.hosting.base_url.clone();
        }
        if let Ok(url) = std::env::var("KILN_SCORING_URL") {
            self.scoring.base_url = url;
        }
    }
}
