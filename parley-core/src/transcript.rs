//! Transcript sinks — where finished turns go.
//!
//! Two sinks ship with the crate:
//!
//! - [`JsonFileSink`] writes a pretty-printed JSON array of
//!   [`TranscriptRecord`]s, replacing the destination in full.
//! - [`ConsoleSink`] writes a human-readable block per turn.
//!
//! Both preserve turn order and produce identical output for identical
//! turns.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ParleyError, Result};
use crate::types::{Mood, PlayerId, Turn};

/// One turn as stored in the JSON transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// Who spoke.
    pub player_id: PlayerId,
    /// RFC 3339 timestamp of the player's message.
    ///
    /// Always carries an offset: input without one was read as UTC and is
    /// written as `+00:00`, while an explicit input offset is kept.
    pub timestamp: String,
    /// What the player said.
    pub player_message: String,
    /// What the NPC answered.
    pub npc_reply: String,
    /// Mood after this message.
    pub npc_mood: Mood,
    /// Earlier messages from the same player, oldest first.
    pub conversation_state: Vec<String>,
}

impl From<&Turn> for TranscriptRecord {
    fn from(turn: &Turn) -> Self {
        Self {
            player_id: turn.player_id,
            timestamp: turn.timestamp.to_rfc3339(),
            player_message: turn.message_text.clone(),
            npc_reply: turn.npc_reply.clone(),
            npc_mood: turn.npc_mood,
            conversation_state: turn.conversation_state.clone(),
        }
    }
}

/// Serialize turns as the on-disk JSON document (2-space indent).
///
/// # Errors
/// Returns `ParleyError::Serialization` if serialization fails.
pub fn to_json(turns: &[Turn]) -> Result<String> {
    let records: Vec<TranscriptRecord> = turns.iter().map(TranscriptRecord::from).collect();
    serde_json::to_string_pretty(&records).map_err(|e| ParleyError::Serialization(e.to_string()))
}

/// Load a transcript written by [`JsonFileSink`].
///
/// # Errors
/// Returns `ParleyError::Io` if the file cannot be read and
/// `ParleyError::Serialization` if it is not a transcript.
pub fn read_transcript(path: &Path) -> Result<Vec<TranscriptRecord>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| ParleyError::Serialization(e.to_string()))
}

/// Destination for a finished transcript.
pub trait TranscriptSink {
    /// Write every turn, in order.
    ///
    /// # Errors
    /// Returns `ParleyError::SinkWrite` if the destination cannot be written.
    fn export(&mut self, turns: &[Turn]) -> Result<()>;
}

/// Writes the transcript as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Create a sink writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TranscriptSink for JsonFileSink {
    fn export(&mut self, turns: &[Turn]) -> Result<()> {
        let json = to_json(turns)?;
        std::fs::write(&self.path, json).map_err(|source| ParleyError::SinkWrite {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), turns = turns.len(), "Saved transcript");
        Ok(())
    }
}

/// Writes a human-readable report, one block per turn.
///
/// ```text
/// Message 1
/// Player ID: 1
/// Timestamp: 2024-05-01T10:00:00+00:00
/// Player Message: 'hello there'
/// NPC Reply: 'Well met.'
/// NPC Mood: friendly
/// Conversation State: []
/// ```
///
/// followed by two blank lines.
pub struct ConsoleSink<W> {
    out: W,
    label: String,
}

impl<W: Write> ConsoleSink<W> {
    /// Create a console sink over any writer.
    pub fn new(out: W) -> Self {
        Self {
            out,
            label: "<console>".into(),
        }
    }

    /// Name reported if a write fails.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Name reported if a write fails.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Flush the underlying writer.
    ///
    /// # Errors
    /// Returns the underlying I/O error.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write one turn's block. `index` is 1-based.
    ///
    /// # Errors
    /// Returns the underlying I/O error.
    pub fn write_turn(&mut self, index: usize, turn: &Turn) -> std::io::Result<()> {
        writeln!(self.out, "Message {index}")?;
        writeln!(self.out, "Player ID: {}", turn.player_id)?;
        writeln!(self.out, "Timestamp: {}", turn.timestamp.to_rfc3339())?;
        writeln!(self.out, "Player Message: '{}'", turn.message_text)?;
        writeln!(self.out, "NPC Reply: '{}'", turn.npc_reply)?;
        writeln!(self.out, "NPC Mood: {}", turn.npc_mood)?;
        writeln!(self.out, "Conversation State: {:?}", turn.conversation_state)?;
        writeln!(self.out)?;
        writeln!(self.out)
    }
}

impl<W: Write> TranscriptSink for ConsoleSink<W> {
    fn export(&mut self, turns: &[Turn]) -> Result<()> {
        let result = turns
            .iter()
            .enumerate()
            .try_for_each(|(i, turn)| self.write_turn(i + 1, turn))
            .and_then(|()| self.out.flush());

        result.map_err(|source| ParleyError::SinkWrite {
            path: PathBuf::from(&self.label),
            source,
        })
    }
}
