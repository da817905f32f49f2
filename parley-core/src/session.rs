//! Session pipeline — replays a batch of player messages as NPC dialogue.
//!
//! Messages are processed as one global chronological stream (stable sort
//! by timestamp; ties keep input order). Players are never grouped, so
//! cross-player interleaving in the transcript matches the input.
//!
//! Per message, in this exact order:
//!
//! 1. read the player's current mood and history tail
//! 2. classify the new mood and store it
//! 3. ask the gateway for a reply (pre-update tail, new mood)
//! 4. build the [`Turn`]
//! 5. append the message to the player's history
//!
//! Each reply is awaited before the next message is touched.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::{Instrument, debug, info, info_span};

use crate::config::ParleyConfig;
use crate::error::Result;
use crate::gateway::{GeneratorClient, ReplyGateway, ReplyRequest};
use crate::ingest;
use crate::memory::ConversationMemory;
use crate::mood;
use crate::types::{Mood, PlayerId, PlayerMessage, SessionId, Turn};

/// Counters describing a finished replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Turns produced.
    pub turns: usize,
    /// Distinct players seen.
    pub players: usize,
    /// Turns whose reply is the fallback line.
    pub fallback_replies: usize,
    /// Turns per resulting mood.
    pub moods: BTreeMap<&'static str, usize>,
}

impl SessionStats {
    /// Number of turns that ended in `mood`.
    #[must_use]
    pub fn mood_count(&self, mood: Mood) -> usize {
        self.moods.get(mood.as_str()).copied().unwrap_or(0)
    }
}

/// Result of one replay.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Identifier used in logs for this run.
    pub id: SessionId,
    /// Transcript in processing order.
    pub turns: Vec<Turn>,
    /// Summary counters.
    pub stats: SessionStats,
}

/// Drives one batch replay.
///
/// Owns the conversation memory for its lifetime; nothing carries over
/// between pipelines.
pub struct SessionPipeline<G> {
    id: SessionId,
    gateway: ReplyGateway<G>,
    memory: ConversationMemory,
    turns: Vec<Turn>,
    fallback_replies: usize,
}

impl<G: GeneratorClient> SessionPipeline<G> {
    /// Create a pipeline around a gateway, exposing `history_window`
    /// earlier messages per player.
    #[must_use]
    pub fn new(gateway: ReplyGateway<G>, history_window: usize) -> Self {
        Self {
            id: SessionId::new(),
            gateway,
            memory: ConversationMemory::with_window(history_window),
            turns: Vec::new(),
            fallback_replies: 0,
        }
    }

    /// Create a pipeline from configuration.
    #[must_use]
    pub fn from_config(client: G, config: &ParleyConfig) -> Self {
        let gateway = ReplyGateway::from_config(client, &config.llm, &config.session);
        Self::new(gateway, config.session.history_window)
    }

    /// This run's identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Conversation memory as it currently stands.
    #[must_use]
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Parse a JSON batch and replay it.
    ///
    /// # Errors
    /// Returns `ParleyError::MalformedInput` before any turn is produced if
    /// the batch does not parse.
    pub async fn run_json(self, json: &str) -> Result<SessionReport> {
        let messages = ingest::parse_batch(json)?;
        Ok(self.run(messages).await)
    }

    /// Read a batch file and replay it.
    ///
    /// # Errors
    /// Returns `ParleyError::Io` if the file cannot be read and
    /// `ParleyError::MalformedInput` if it does not parse.
    pub async fn run_file(self, path: &Path) -> Result<SessionReport> {
        let messages = ingest::read_batch(path)?;
        Ok(self.run(messages).await)
    }

    /// Replay already-validated messages.
    pub async fn run(self, messages: Vec<PlayerMessage>) -> SessionReport {
        self.run_observed(messages, |_, _| {}).await
    }

    /// Replay already-validated messages, handing each finished turn to
    /// `on_turn` together with its 1-based position before the next message
    /// is processed.
    pub async fn run_observed<F>(
        mut self,
        mut messages: Vec<PlayerMessage>,
        mut on_turn: F,
    ) -> SessionReport
    where
        F: FnMut(usize, &Turn),
    {
        let span = info_span!("session", id = %self.id);

        async move {
            info!(messages = messages.len(), "Starting replay");

            // `sort_by_key` is stable: equal timestamps keep input order.
            messages.sort_by_key(|m| m.timestamp);

            for (i, message) in messages.into_iter().enumerate() {
                let turn = self.process(message).await;
                on_turn(i + 1, turn);
            }

            let report = self.finish();
            info!(
                turns = report.stats.turns,
                players = report.stats.players,
                fallbacks = report.stats.fallback_replies,
                "Replay finished"
            );
            report
        }
        .instrument(span)
        .await
    }

    /// Process one message and append its turn.
    pub async fn process(&mut self, message: PlayerMessage) -> &Turn {
        let player = message.player_id;

        let conversation_state = self.memory.history_tail(player);
        let current_mood = self.memory.mood(player);
        let npc_mood = mood::classify(&message.text, current_mood);
        self.memory.set_mood(player, npc_mood);

        let request = ReplyRequest {
            player_id: player,
            message: message.text.clone(),
            history: conversation_state.clone(),
            mood: npc_mood,
        };
        let reply = self.gateway.reply(&request).await;
        if reply.is_fallback() {
            self.fallback_replies += 1;
        }

        self.memory.record(player, message.text.as_str());

        debug!(
            turn = self.turns.len() + 1,
            player = %player,
            from = %current_mood,
            to = %npc_mood,
            history = conversation_state.len(),
            "Processed message"
        );

        let index = self.turns.len();
        self.turns.push(Turn {
            player_id: player,
            message_text: message.text,
            npc_reply: reply.text,
            conversation_state,
            npc_mood,
            timestamp: message.timestamp,
        });
        &self.turns[index]
    }

    /// Turns produced so far.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Consume the pipeline into its report.
    #[must_use]
    pub fn finish(self) -> SessionReport {
        let stats = compute_stats(&self.turns, self.fallback_replies);
        SessionReport {
            id: self.id,
            turns: self.turns,
            stats,
        }
    }
}

fn compute_stats(turns: &[Turn], fallback_replies: usize) -> SessionStats {
    let players: BTreeSet<PlayerId> = turns.iter().map(|t| t.player_id).collect();
    let mut moods = BTreeMap::new();
    for turn in turns {
        *moods.entry(turn.npc_mood.as_str()).or_insert(0) += 1;
    }

    SessionStats {
        turns: turns.len(),
        players: players.len(),
        fallback_replies,
        moods,
    }
}
