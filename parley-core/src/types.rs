//! Core type definitions for Parley.
//!
//! All wire-facing types are serializable; the transcript record layout is
//! owned by [`crate::transcript`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Identifier of a player as it appears in the input batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PlayerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Unique identifier for one batch replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Wall-clock instant a message was sent.
///
/// Keeps the offset it was written with; comparisons use the instant.
pub type Timestamp = DateTime<FixedOffset>;

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

/// Coarse sentiment the NPC attributes to a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// No strong signal either way. Every player starts here.
    #[default]
    Neutral,
    /// Polite, grateful, warm.
    Friendly,
    /// Hostile or frustrated.
    Angry,
}

impl Mood {
    /// All moods, in declaration order.
    #[must_use]
    pub fn all() -> &'static [Mood] {
        &[Self::Neutral, Self::Friendly, Self::Angry]
    }

    /// Lowercase label used in prompts and transcripts.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Friendly => "friendly",
            Self::Angry => "angry",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neutral" => Ok(Self::Neutral),
            "friendly" => Ok(Self::Friendly),
            "angry" => Ok(Self::Angry),
            other => Err(format!("unknown mood: '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Messages & Turns
// ---------------------------------------------------------------------------

/// One chat line sent by a player. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerMessage {
    /// Who said it.
    pub player_id: PlayerId,
    /// What they said.
    pub text: String,
    /// When they said it.
    pub timestamp: Timestamp,
}

impl PlayerMessage {
    /// Create a new player message.
    #[must_use]
    pub fn new(player_id: impl Into<PlayerId>, text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            player_id: player_id.into(),
            text: text.into(),
            timestamp,
        }
    }
}

/// One processed exchange: the player's message and the NPC's answer.
///
/// `conversation_state` is the player's history tail as it stood *before*
/// `message_text` was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Who spoke.
    pub player_id: PlayerId,
    /// The player's message.
    pub message_text: String,
    /// The NPC's reply (generated or fallback).
    pub npc_reply: String,
    /// Up to the last N earlier messages from the same player, oldest first.
    pub conversation_state: Vec<String>,
    /// Mood after classifying `message_text`.
    pub npc_mood: Mood,
    /// Timestamp of the player's message.
    pub timestamp: Timestamp,
}
