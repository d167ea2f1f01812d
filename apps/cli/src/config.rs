//! CLI configuration loading.

use anyhow::Context;
use kiln_core::PipelineConfig;
use std::path::Path;

/// Load pipeline configuration.
///
/// Precedence:
/// 1. CLI arguments (handled by clap)
/// 2. Environment variables (`KILN_*`)
/// 3. Config file (`--config` path or `./kiln.toml`)
/// 4. Defaults
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => {
            let mut config = PipelineConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => PipelineConfig::discover_and_load().context("Failed to load configuration"),
    }
}
