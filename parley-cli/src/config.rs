//! Configuration loading for the `parley` binary.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML file,
//! command-line flags (and their `PARLEY_*` environment variables).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use parley_core::config::ParleyConfig;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "parley.toml";

/// Command-line values that replace configured ones when present.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
    /// Suppress the console report.
    pub quiet: bool,
}

impl Overrides {
    /// Write every present override into `config`.
    pub fn apply(&self, config: &mut ParleyConfig) {
        if let Some(provider) = &self.provider {
            config.llm.provider.clone_from(provider);
        }
        if let Some(base_url) = &self.base_url {
            config.llm.base_url.clone_from(base_url);
        }
        if let Some(model) = &self.model {
            config.llm.model.clone_from(model);
        }
        if let Some(output) = &self.output {
            config.transcript.output_path.clone_from(output);
        }
        if self.quiet {
            config.transcript.console = false;
        }
    }
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
/// used if present, otherwise defaults.
///
/// # Errors
///
/// Fails if the file cannot be read or parsed.
pub fn load(path: Option<&Path>) -> Result<ParleyConfig> {
    match path {
        Some(path) => ParleyConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                debug!(path = DEFAULT_CONFIG_FILE, "Using config from working directory");
                ParleyConfig::from_file(fallback)
                    .with_context(|| format!("loading config from {DEFAULT_CONFIG_FILE}"))
            } else {
                Ok(ParleyConfig::default())
            }
        }
    }
}

/// Load, apply overrides, then validate.
///
/// # Errors
///
/// Fails on an unreadable file or an invalid final configuration.
pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<ParleyConfig> {
    let mut config = load(path)?;
    overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}
