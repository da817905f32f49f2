//! Conversation memory — what the NPC remembers about each player.
//!
//! Every player gets a [`PlayerMemory`] holding their full message history
//! and their current [`Mood`]. History is append-only and never trimmed; only
//! the last `window` entries are ever handed out.
//!
//! Lookups that take `&mut self` follow an explicit *insert default on first
//! access* contract: the first time a player id is observed, a
//! [`PlayerMemory::default()`] (neutral mood, empty history) is stored for it.
//! Use [`ConversationMemory::get`] to inspect without inserting.

pub mod player;

pub use player::PlayerMemory;

use std::collections::BTreeMap;

use crate::types::{Mood, PlayerId};

/// Default number of earlier messages surfaced per player.
pub const DEFAULT_HISTORY_WINDOW: usize = 3;

/// Per-session store of player histories and moods.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    players: BTreeMap<PlayerId, PlayerMemory>,
    window: usize,
}

impl ConversationMemory {
    /// Create an empty memory with the default history window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_window(DEFAULT_HISTORY_WINDOW)
    }

    /// Create an empty memory exposing at most `window` earlier messages.
    #[must_use]
    pub fn with_window(window: usize) -> Self {
        Self {
            players: BTreeMap::new(),
            window,
        }
    }

    /// Size of the history window.
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// The player's entry, inserting a default one on first access.
    pub fn entry(&mut self, player: PlayerId) -> &mut PlayerMemory {
        self.players.entry(player).or_default()
    }

    /// Look up a player without inserting.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&PlayerMemory> {
        self.players.get(&player)
    }

    /// The last `window` messages from `player`, oldest first.
    ///
    /// Returns an owned snapshot so it stays valid after [`Self::record`].
    pub fn history_tail(&mut self, player: PlayerId) -> Vec<String> {
        let window = self.window;
        self.entry(player).tail(window).to_vec()
    }

    /// The player's current mood ([`Mood::Neutral`] for a new player).
    pub fn mood(&mut self, player: PlayerId) -> Mood {
        self.entry(player).mood
    }

    /// Overwrite the player's current mood.
    pub fn set_mood(&mut self, player: PlayerId, mood: Mood) {
        self.entry(player).mood = mood;
    }

    /// Append a message to the player's full history.
    pub fn record(&mut self, player: PlayerId, text: impl Into<String>) {
        self.entry(player).history.push(text.into());
    }

    /// Every message the player has sent this session, oldest first.
    #[must_use]
    pub fn full_history(&self, player: PlayerId) -> &[String] {
        self.players
            .get(&player)
            .map(|p| p.history.as_slice())
            .unwrap_or_default()
    }

    /// Known players in ascending id order.
    pub fn players(&self) -> impl Iterator<Item = (PlayerId, &PlayerMemory)> {
        self.players.iter().map(|(id, mem)| (*id, mem))
    }

    /// Number of players observed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether no player has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: PlayerId = PlayerId(1);
    const BOB: PlayerId = PlayerId(2);

    #[test]
    fn new_player_defaults_on_first_access() {
        let mut memory = ConversationMemory::new();
        assert!(memory.get(ALICE).is_none());

        assert_eq!(memory.mood(ALICE), Mood::Neutral);
        assert!(memory.history_tail(ALICE).is_empty());
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn get_does_not_insert() {
        let memory = ConversationMemory::new();
        assert!(memory.get(ALICE).is_none());
        assert!(memory.is_empty());
    }

    #[test]
    fn tail_is_bounded_but_history_is_not() {
        let mut memory = ConversationMemory::new();
        for i in 0..5 {
            memory.record(ALICE, format!("msg {i}"));
        }

        assert_eq!(memory.history_tail(ALICE), vec!["msg 2", "msg 3", "msg 4"]);
        assert_eq!(memory.full_history(ALICE).len(), 5);
    }

    #[test]
    fn tail_snapshot_is_taken_before_record() {
        let mut memory = ConversationMemory::new();
        memory.record(ALICE, "first");

        let tail = memory.history_tail(ALICE);
        memory.record(ALICE, "second");

        assert_eq!(tail, vec!["first"]);
    }

    #[test]
    fn players_are_isolated() {
        let mut memory = ConversationMemory::new();
        memory.record(ALICE, "from alice");
        memory.set_mood(ALICE, Mood::Angry);

        assert!(memory.history_tail(BOB).is_empty());
        assert_eq!(memory.mood(BOB), Mood::Neutral);
        assert_eq!(memory.mood(ALICE), Mood::Angry);
    }

    #[test]
    fn custom_window() {
        let mut memory = ConversationMemory::with_window(1);
        memory.record(ALICE, "a");
        memory.record(ALICE, "b");
        assert_eq!(memory.history_tail(ALICE), vec!["b"]);
    }

    #[test]
    fn players_iterate_in_id_order() {
        let mut memory = ConversationMemory::new();
        memory.record(PlayerId(9), "x");
        memory.record(PlayerId(3), "y");
        let ids: Vec<_> = memory.players().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![PlayerId(3), PlayerId(9)]);
    }
}
