//! Error types for the Parley core library.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Parley operations.
///
/// Generation failures never surface here; the gateway absorbs them
/// (see [`crate::gateway::GeneratorError`]).
#[derive(Error, Debug)]
pub enum ParleyError {
    /// An input record is missing a field, has the wrong type, or carries
    /// an unparsable timestamp. Fatal for the whole batch.
    #[error("Malformed input{}: {reason}", record_label(.index))]
    MalformedInput {
        /// Zero-based position of the offending record in the input array.
        /// `None` when the batch itself (not a record) is malformed.
        index: Option<usize>,
        /// What was wrong with it.
        reason: String,
    },

    /// The transcript could not be persisted.
    #[error("Failed to write transcript to {}", path.display())]
    SinkWrite {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParleyError {
    /// Build a `MalformedInput` error for the record at `index`.
    #[must_use]
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            index: Some(index),
            reason: reason.into(),
        }
    }

    /// Whether this is an input validation failure.
    #[must_use]
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}

fn record_label(index: &Option<usize>) -> String {
    index.map(|i| format!(" (record {i})")).unwrap_or_default()
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ParleyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_write_leaves_cause_to_source_chain() {
        use std::error::Error as _;

        let err = ParleyError::SinkWrite {
            path: PathBuf::from("out.json"),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"),
        };
        assert_eq!(err.to_string(), "Failed to write transcript to out.json");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("closed"));
    }

    #[test]
    fn malformed_message_names_record() {
        let err = ParleyError::malformed(2, "missing field `timestamp`");
        assert!(err.is_malformed_input());
        assert_eq!(
            err.to_string(),
            "Malformed input (record 2): missing field `timestamp`"
        );
    }

    #[test]
    fn batch_level_malformed_has_no_record() {
        let err = ParleyError::MalformedInput {
            index: None,
            reason: "expected a JSON array".into(),
        };
        assert_eq!(err.to_string(), "Malformed input: expected a JSON array");
    }
}
