//! # parley-cli — Integration Layer for Parley
//!
//! Connects the backend-agnostic `parley-core` pipeline to the HTTP chat
//! backends in `parley-llm`, and hosts the `parley` binary.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │               parley (bin)               │
//! │  ┌────────────┐        ┌──────────────┐  │
//! │  │   config   │        │    runner    │  │
//! │  └─────┬──────┘        └──────┬───────┘  │
//! │        ▼                      ▼          │
//! │  ┌─────────────┐     ┌────────────────┐  │
//! │  │ parley-core │◄────┤     bridge     │  │
//! │  └─────────────┘     └───────┬────────┘  │
//! │                              ▼           │
//! │                      ┌──────────────┐    │
//! │                      │  parley-llm  │    │
//! │                      └──────────────┘    │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `bridge`: `LlmGenerator`, the `GeneratorClient` over `LlmClient`
//! - `config`: config file discovery and command-line overrides
//! - `runner`: the `run` command: replay, console report, JSON transcript

pub mod bridge;
pub mod config;
pub mod runner;
