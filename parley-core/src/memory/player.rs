//! Per-player conversation state.

use serde::{Deserialize, Serialize};

use crate::types::Mood;

/// What the NPC remembers about one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerMemory {
    /// Every message the player sent, oldest first.
    pub history: Vec<String>,
    /// The player's current mood.
    pub mood: Mood,
}

impl PlayerMemory {
    /// The last `window` messages, oldest first.
    #[must_use]
    pub fn tail(&self, window: usize) -> &[String] {
        let start = self.history.len().saturating_sub(window);
        &self.history[start..]
    }

    /// Number of messages recorded.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.history.len()
    }
}
