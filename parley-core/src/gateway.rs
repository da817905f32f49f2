//! Reply gateway — the boundary to the text-generation backend.
//!
//! The pipeline never talks to a backend directly. It hands a
//! [`ReplyRequest`] to a [`ReplyGateway`], which:
//!
//! 1. calls the wrapped [`GeneratorClient`],
//! 2. bounds the call with a timeout,
//! 3. turns any [`GeneratorError`] into the configured fallback line.
//!
//! Errors are logged at `warn` and never returned; a failing backend can
//! degrade a transcript but cannot abort a batch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{LlmConfig, SessionConfig};
use crate::types::{Mood, PlayerId};

/// What the backend is asked to respond to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    /// Who is speaking.
    pub player_id: PlayerId,
    /// The new message.
    pub message: String,
    /// Earlier messages from the same player, oldest first.
    pub history: Vec<String>,
    /// The player's mood after classifying `message`.
    pub mood: Mood,
}

/// Why a backend call failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeneratorError {
    /// The request could not be delivered or the backend answered with an
    /// error status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The call did not finish in time.
    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// The backend answered, but not with usable text.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No backend is configured or reachable.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// A text-generation backend.
///
/// Implementations return the raw reply text; policy (timeouts, fallback,
/// logging) lives in [`ReplyGateway`].
#[async_trait]
pub trait GeneratorClient: Send + Sync {
    /// Produce the NPC's reply to `request`.
    async fn generate(&self, request: &ReplyRequest) -> Result<String, GeneratorError>;
}

#[async_trait]
impl<T: GeneratorClient + ?Sized> GeneratorClient for Arc<T> {
    async fn generate(&self, request: &ReplyRequest) -> Result<String, GeneratorError> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<T: GeneratorClient + ?Sized> GeneratorClient for Box<T> {
    async fn generate(&self, request: &ReplyRequest) -> Result<String, GeneratorError> {
        (**self).generate(request).await
    }
}

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    /// Produced by the backend.
    Generated,
    /// Backend failed; the fallback line was used.
    Fallback,
}

/// A reply ready to be recorded on a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text to record.
    pub text: String,
    /// Whether it was generated or substituted.
    pub source: ReplySource,
}

impl Reply {
    /// Whether this reply is the fallback line.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == ReplySource::Fallback
    }
}

/// Wraps a [`GeneratorClient`] with a timeout and a fallback reply.
pub struct ReplyGateway<G> {
    client: G,
    fallback_reply: String,
    timeout: Duration,
}

impl<G: GeneratorClient> ReplyGateway<G> {
    /// Create a gateway.
    #[must_use]
    pub fn new(client: G, fallback_reply: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            fallback_reply: fallback_reply.into(),
            timeout,
        }
    }

    /// Create a gateway from configuration.
    #[must_use]
    pub fn from_config(client: G, llm: &LlmConfig, session: &SessionConfig) -> Self {
        Self::new(client, session.fallback_reply.clone(), llm.request_timeout())
    }

    /// The line used when the backend fails.
    #[must_use]
    pub fn fallback_reply(&self) -> &str {
        &self.fallback_reply
    }

    /// The wrapped client.
    #[must_use]
    pub fn client(&self) -> &G {
        &self.client
    }

    /// Ask the backend for a reply. Never fails.
    pub async fn reply(&self, request: &ReplyRequest) -> Reply {
        match self.try_generate(request).await {
            Ok(text) => {
                debug!(player = %request.player_id, chars = text.len(), "Generated reply");
                Reply {
                    text,
                    source: ReplySource::Generated,
                }
            }
            Err(err) => {
                warn!(
                    player = %request.player_id,
                    error = %err,
                    "Reply generation failed, using fallback"
                );
                Reply {
                    text: self.fallback_reply.clone(),
                    source: ReplySource::Fallback,
                }
            }
        }
    }

    async fn try_generate(&self, request: &ReplyRequest) -> Result<String, GeneratorError> {
        let text = tokio::time::timeout(self.timeout, self.client.generate(request))
            .await
            .map_err(|_| GeneratorError::Timeout(duration_ms(self.timeout)))??;

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(GeneratorError::MalformedResponse("empty reply".into()));
        }
        Ok(trimmed.to_string())
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
