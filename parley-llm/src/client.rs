//! LLM Client — unified chat interface for Ollama and OpenAI-compatible backends.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse};

/// Provider backend for LLM inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmProvider {
    /// Ollama running locally (recommended).
    Ollama { base_url: String },
    /// OpenAI-compatible API (also works with Together, Groq, vLLM, etc.).
    OpenAiCompatible { base_url: String, api_key: String },
    /// No LLM available. All calls return an error, triggering the fallback reply.
    None,
}

impl LlmProvider {
    /// Build a provider from its configuration name.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::ConfigError` for an unknown name, or for `openai`
    /// without an API key.
    pub fn from_name(
        name: &str,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        match name {
            "ollama" => Ok(Self::Ollama { base_url }),
            "openai" => {
                let api_key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                    LlmError::ConfigError("openai provider requires an API key".into())
                })?;
                Ok(Self::OpenAiCompatible { base_url, api_key })
            }
            "none" => Ok(Self::None),
            other => Err(LlmError::ConfigError(format!("unknown provider '{other}'"))),
        }
    }

    /// Short provider name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ollama { .. } => "ollama",
            Self::OpenAiCompatible { .. } => "openai",
            Self::None => "none",
        }
    }
}

/// The main LLM client that routes requests to the configured backend.
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    model: String,
    max_retries: u32,
}

impl LlmClient {
    /// Create a new LLM client.
    #[must_use]
    pub fn new(provider: LlmProvider, model: impl Into<String>, max_retries: u32) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
            max_retries,
        }
    }

    /// Create a client with no LLM backend (all calls fail → fallback reply).
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, String::new(), 0)
    }

    /// Model name sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The configured backend.
    #[must_use]
    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    /// Generate a response from the LLM.
    ///
    /// Returns `Err` if the LLM is unavailable or all retries fail.
    /// The caller should fall back on error.
    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable("No LLM provider configured".into())),
            LlmProvider::Ollama { base_url } => self.generate_ollama(base_url, request).await,
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                self.generate_openai(base_url, api_key, request).await
            }
        }
    }

    /// Generate using Ollama's chat API.
    async fn generate_ollama(
        &self,
        base_url: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse, LlmError> {
        let url = format!("{base_url}/api/chat");
        let body = json!({
            "model": self.model,
            "messages": request.messages(),
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            }
        });

        let (json, latency_ms) = self.post_with_retries(&url, &body, None, request).await?;

        let text = json["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::ParseError("missing message.content in Ollama reply".into()))?
            .to_string();

        Ok(LlmResponse {
            text,
            tokens_generated: token_count(&json["eval_count"]),
            latency_ms,
            model: self.model.clone(),
        })
    }

    /// Generate using OpenAI-compatible API.
    async fn generate_openai(
        &self,
        base_url: &str,
        api_key: &str,
        request: &LlmRequest,
    ) -> Result<LlmResponse, LlmError> {
        let url = format!("{base_url}/v1/chat/completions");
        let body = json!({
            "model": self.model,
            "messages": request.messages(),
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let (json, latency_ms) = self
            .post_with_retries(&url, &body, Some(api_key), request)
            .await?;

        let text = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                LlmError::ParseError("missing choices[0].message.content in reply".into())
            })?
            .to_string();

        Ok(LlmResponse {
            text,
            tokens_generated: token_count(&json["usage"]["completion_tokens"]),
            latency_ms,
            model: self.model.clone(),
        })
    }

    /// POST `body` to `url`, retrying transport failures and error statuses.
    ///
    /// A success status with an undecodable body is not retried.
    async fn post_with_retries(
        &self,
        url: &str,
        body: &Value,
        bearer: Option<&str>,
        request: &LlmRequest,
    ) -> Result<(Value, u64), LlmError> {
        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(
                    "Retrying {} call (attempt {}/{})",
                    self.provider.name(),
                    attempt + 1,
                    self.max_retries + 1
                );
            }

            let start = Instant::now();
            let mut builder = self
                .http
                .post(url)
                .json(body)
                .timeout(Duration::from_millis(request.timeout_ms));
            if let Some(key) = bearer {
                builder = builder.bearer_auth(key);
            }
            let result = builder.send().await;
            let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match result {
                Ok(resp) if resp.status().is_success() => {
                    let json: Value = resp
                        .json()
                        .await
                        .map_err(|e| LlmError::ParseError(e.to_string()))?;
                    return Ok((json, latency_ms));
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    last_error = format!("HTTP {status}: {body}");
                    warn!("{} returned error: {}", self.provider.name(), last_error);
                }
                Err(e) => {
                    if e.is_timeout() {
                        warn!(
                            "{} request timed out after {}ms",
                            self.provider.name(),
                            request.timeout_ms
                        );
                        if self.max_retries == 0 {
                            return Err(LlmError::Timeout(request.timeout_ms));
                        }
                    } else {
                        warn!("{} request failed: {}", self.provider.name(), e);
                        if self.max_retries == 0 {
                            return Err(LlmError::from(e));
                        }
                    }
                    last_error = e.to_string();
                }
            }
        }

        if self.max_retries == 0 {
            return Err(LlmError::RequestFailed(last_error));
        }
        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error,
        })
    }

    /// Check if the LLM client has a backend configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }
}

fn token_count(value: &Value) -> u32 {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}
