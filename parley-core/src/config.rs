//! Configuration for a Parley replay.
//!
//! Maps directly to `parley.toml`. Every field has a default, so an empty
//! file (or no file at all) is a valid configuration.
//!
//! ```toml
//! [general]
//! log_level = "debug"
//!
//! [llm]
//! provider = "ollama"
//! model = "llama3"
//!
//! [transcript]
//! output_path = "out/chat.json"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ParleyError, Result};

/// Providers the LLM layer knows how to talk to.
pub const KNOWN_PROVIDERS: &[&str] = &["ollama", "openai", "none"];

/// Top-level Parley configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Text-generation backend settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Replay behavior.
    #[serde(default)]
    pub session: SessionConfig,
    /// Where and how the transcript is written.
    #[serde(default)]
    pub transcript: TranscriptConfig,
}

impl ParleyConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ParleyError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| ParleyError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// # Errors
    /// Returns `ParleyError::Config` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.session.history_window == 0 {
            return Err(ParleyError::Config(
                "session.history_window must be at least 1".into(),
            ));
        }
        if self.llm.request_timeout_ms == 0 {
            return Err(ParleyError::Config(
                "llm.request_timeout_ms must be greater than 0".into(),
            ));
        }
        if !KNOWN_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ParleyError::Config(format!(
                "llm.provider '{}' is not one of {KNOWN_PROVIDERS:?}",
                self.llm.provider
            )));
        }
        if self.transcript.output_path.as_os_str().is_empty() {
            return Err(ParleyError::Config(
                "transcript.output_path must not be empty".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when `RUST_LOG` is unset: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// LLM integration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "ollama", "openai", "none".
    #[serde(default = "default_ollama")]
    pub provider: String,
    /// Base URL for the LLM API.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Model name sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key (OpenAI-compatible only).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Hard timeout for one reply in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Extra attempts after a failed call before falling back.
    #[serde(default)]
    pub max_retries: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Optional TOML file overriding the built-in dialogue prompt.
    #[serde(default)]
    pub prompt_file: Option<PathBuf>,
}

impl LlmConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_ollama(),
            base_url: default_ollama_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            request_timeout_ms: default_timeout_ms(),
            max_retries: 0,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            prompt_file: None,
        }
    }
}

/// Replay behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How many earlier messages per player are shown to the backend and
    /// recorded on each turn.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Reply substituted when the backend fails.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            fallback_reply: default_fallback_reply(),
        }
    }
}

/// Transcript output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// JSON transcript destination. Overwritten on every run.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Print the per-turn report to stdout.
    #[serde(default = "default_true")]
    pub console: bool,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            console: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_ollama() -> String { "ollama".to_string() }
fn default_ollama_url() -> String { "http://localhost:11434".to_string() }
fn default_model() -> String { "llama3".to_string() }
fn default_api_key_env() -> String { "OPENAI_API_KEY".to_string() }
fn default_timeout_ms() -> u64 { 30_000 }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 150 }
fn default_history_window() -> usize { crate::memory::DEFAULT_HISTORY_WINDOW }
fn default_fallback_reply() -> String { "Issue with ollama response".to_string() }
fn default_output_path() -> PathBuf { PathBuf::from("ollama_npc_chat_history.json") }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ParleyConfig::from_toml("").expect("empty config parses");
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.base_url, "http://localhost:11434");
        assert_eq!(config.session.history_window, 3);
        assert_eq!(config.session.fallback_reply, "Issue with ollama response");
        assert_eq!(
            config.transcript.output_path,
            PathBuf::from("ollama_npc_chat_history.json")
        );
        assert!(config.transcript.console);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = ParleyConfig::from_toml(
            r#"
            [llm]
            model = "mistral"
            max_retries = 2
            "#,
        )
        .expect("parses");
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.llm.max_retries, 2);
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = ParleyConfig::from_toml("[llm\nmodel=").expect_err("should fail");
        assert!(matches!(err, ParleyError::Config(_)));
    }

    #[test]
    fn zero_window_rejected() {
        let mut config = ParleyConfig::default();
        config.session.history_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_provider_rejected() {
        let mut config = ParleyConfig::default();
        config.llm.provider = "carrier-pigeon".into();
        let err = config.validate().expect_err("should fail");
        assert!(err.to_string().contains("carrier-pigeon"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = ParleyConfig::default();
        config.llm.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
