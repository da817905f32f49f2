//! # parley-llm — LLM Abstraction Layer for Parley
//!
//! Provides a unified interface for chat-style LLM inference:
//!   - **Ollama** (local, default) via `/api/chat`
//!   - **OpenAI-compatible API** via `/v1/chat/completions`
//!   - **None**: every call fails, so callers fall back
//!
//! The crate knows nothing about players or moods beyond what the prompt
//! templates in [`prompt`] need; the game-side adapter lives in `parley-cli`.

pub mod client;
pub mod error;
pub mod prompt;
pub mod types;

pub use client::{LlmClient, LlmProvider};
pub use error::LlmError;
pub use prompt::DialoguePrompt;
pub use types::{ChatMessage, ChatRole, LlmRequest, LlmResponse};
