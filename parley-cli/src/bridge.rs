//! Bridge module — maps between `parley-core` and `parley-llm` types.
//!
//! `parley-core` only knows the [`GeneratorClient`] capability and its
//! [`GeneratorError`] kinds. `parley-llm` only knows chat requests and
//! [`LlmError`]. [`LlmGenerator`] renders the dialogue prompt, calls the
//! client and translates the result so neither crate depends on the other.

use async_trait::async_trait;
use tracing::debug;

use parley_core::config::LlmConfig;
use parley_core::gateway::{GeneratorClient, GeneratorError, ReplyRequest};
use parley_llm::{DialoguePrompt, LlmClient, LlmError, LlmProvider, LlmRequest};

/// Map an LLM failure onto the gateway's error kinds.
#[must_use]
pub fn generator_error(err: LlmError) -> GeneratorError {
    match err {
        LlmError::RequestFailed(msg) => GeneratorError::Transport(msg),
        LlmError::RetriesExhausted { .. } => GeneratorError::Transport(err.to_string()),
        LlmError::ParseError(msg) => GeneratorError::MalformedResponse(msg),
        LlmError::Timeout(ms) => GeneratorError::Timeout(ms),
        LlmError::Unavailable(msg) | LlmError::ConfigError(msg) => {
            GeneratorError::Unavailable(msg)
        }
    }
}

/// The dialogue prompt named by `llm.prompt_file`, or the built-in one.
///
/// # Errors
///
/// Returns `LlmError::ConfigError` if the prompt file cannot be loaded.
pub fn load_prompt(config: &LlmConfig) -> Result<DialoguePrompt, LlmError> {
    match &config.prompt_file {
        Some(path) => DialoguePrompt::from_file(path),
        None => Ok(DialoguePrompt::builtin()),
    }
}

/// A [`GeneratorClient`] backed by an [`LlmClient`].
pub struct LlmGenerator {
    client: LlmClient,
    prompt: DialoguePrompt,
    max_tokens: u32,
    temperature: f32,
    timeout_ms: u64,
}

impl LlmGenerator {
    /// Wrap a client with the given prompt templates and request defaults.
    #[must_use]
    pub fn new(client: LlmClient, prompt: DialoguePrompt) -> Self {
        let defaults = LlmRequest::dialogue("", "");
        Self {
            client,
            prompt,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            timeout_ms: defaults.timeout_ms,
        }
    }

    /// Build the client, prompt and sampling settings from `[llm]`.
    ///
    /// For the `openai` provider the API key is read from the environment
    /// variable named by `api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::ConfigError` for an unknown provider, a missing API
    /// key, or an unreadable prompt file.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = if config.provider == "openai" {
            std::env::var(&config.api_key_env).ok()
        } else {
            None
        };
        let provider = LlmProvider::from_name(&config.provider, &config.base_url, api_key)?;
        let prompt = load_prompt(config)?;
        debug!(
            provider = provider.name(),
            model = %config.model,
            prompt_version = %prompt.version,
            "Configured LLM generator"
        );

        let client = LlmClient::new(provider, &config.model, config.max_retries);
        Ok(Self {
            client,
            prompt,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_ms: config.request_timeout_ms,
        })
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &LlmClient {
        &self.client
    }

    /// The prompt templates in use.
    #[must_use]
    pub fn prompt(&self) -> &DialoguePrompt {
        &self.prompt
    }

    /// The chat request sent for one player message.
    #[must_use]
    pub fn build_request(&self, request: &ReplyRequest) -> LlmRequest {
        let (system, user) = self.prompt.render(
            &request.player_id.to_string(),
            request.mood.as_str(),
            &request.history,
            &request.message,
        );
        LlmRequest::dialogue(system, user)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_timeout(self.timeout_ms)
    }
}

#[async_trait]
impl GeneratorClient for LlmGenerator {
    async fn generate(&self, request: &ReplyRequest) -> Result<String, GeneratorError> {
        let llm_request = self.build_request(request);
        let response = self.client.generate(&llm_request).await.map_err(generator_error)?;
        debug!(
            player = %request.player_id,
            latency_ms = response.latency_ms,
            tokens = response.tokens_generated,
            "LLM reply received"
        );
        Ok(response.text)
    }
}
