//! # Parley Core Library
//!
//! Game-agnostic NPC dialogue replay.
//!
//! A batch of timestamped player chat messages is replayed in global
//! chronological order. For every message the NPC:
//!
//! - **Classifies** the player's mood from keyword heuristics ([`mood`])
//! - **Remembers** what the player said before ([`memory`])
//! - **Replies** through a text-generation backend, falling back to a fixed
//!   line when the backend fails ([`gateway`])
//! - **Records** a [`Turn`] in the session transcript ([`session`],
//!   [`transcript`])
//!
//! ## Pipeline
//!
//! ```text
//! players.json ──► ingest ──► sort (stable, by timestamp)
//!                                   │
//!                  ┌────────────────┘
//!                  ▼
//!   for each message: mood ─► memory tail ─► gateway ─► Turn ─► memory append
//!                                                         │
//!                                                         ▼
//!                                                 transcript sinks
//! ```
//!
//! Everything here is single-threaded and deterministic given a
//! deterministic [`GeneratorClient`].

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod ingest;
pub mod memory;
pub mod mood;
pub mod session;
pub mod transcript;
pub mod types;

pub use config::ParleyConfig;
pub use error::ParleyError;
pub use gateway::{GeneratorClient, GeneratorError, Reply, ReplyGateway, ReplyRequest};
pub use memory::ConversationMemory;
pub use session::{SessionPipeline, SessionReport, SessionStats};
pub use types::*;

/// Crate version, reported by `parley version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
