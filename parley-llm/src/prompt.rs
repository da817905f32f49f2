//! Prompt templates for NPC dialogue.
//!
//! The built-in templates are compiled in. A deployment can replace them
//! with a TOML file:
//!
//! ```toml
//! [prompt]
//! version = "2"
//! system = "You are a grumpy innkeeper."
//! user = "Player {player_id} ({mood}) says: {message}\n{previous_interactions}"
//! ```
//!
//! Placeholders: `{player_id}`, `{mood}`, `{previous_interactions}`,
//! `{message}`.

use std::path::Path;

use serde::Deserialize;

use crate::error::LlmError;

/// System instruction sent with every dialogue request.
pub const NPC_DIALOGUE_SYSTEM: &str =
    "You are a helpful NPC in a fantasy game. Keep responses brief and in character.";

/// User prompt for one player message.
pub const NPC_DIALOGUE_USER: &str = r#"You are an NPC (Non-Playable Character) in a role-playing game.
Your job is to respond in a way that feels immersive and natural.

Context:
- Player's current mood: {mood} (Player {player_id})
- Previous interactions:
{previous_interactions}
- Player {player_id} just said: "{message}"

Respond in character as the NPC. Keep your response small (1-2 sentences maximum)."#;

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value in a single pass over the
/// template. Inserted values are never rescanned, and unknown `{...}` runs
/// are copied through unchanged.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (*value, close))
        });
        match hit {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Number the earlier utterances, one per line: `1. Player: "..."`.
///
/// Empty history renders as an empty string.
#[must_use]
pub fn format_history(history: &[String]) -> String {
    history
        .iter()
        .enumerate()
        .map(|(i, msg)| format!("{}. Player: \"{msg}\"\n", i + 1))
        .collect()
}

#[derive(Debug, Deserialize)]
struct TomlPromptFile {
    prompt: TomlPromptData,
}

#[derive(Debug, Deserialize)]
struct TomlPromptData {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default = "default_system")]
    system: String,
    user: String,
}

fn default_version() -> String {
    "custom".into()
}

fn default_system() -> String {
    NPC_DIALOGUE_SYSTEM.into()
}

/// A ready-to-render dialogue prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialoguePrompt {
    /// Version label, `"builtin"` for the compiled-in templates.
    pub version: String,
    /// System prompt template.
    pub system: String,
    /// User prompt template.
    pub user: String,
}

impl Default for DialoguePrompt {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DialoguePrompt {
    /// The compiled-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            version: "builtin".into(),
            system: NPC_DIALOGUE_SYSTEM.into(),
            user: NPC_DIALOGUE_USER.into(),
        }
    }

    /// Parse templates from a TOML document with a `[prompt]` table.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::ConfigError` if the document is not valid TOML or
    /// lacks `prompt.user`.
    pub fn from_toml(content: &str) -> Result<Self, LlmError> {
        let parsed: TomlPromptFile = toml::from_str(content)
            .map_err(|e| LlmError::ConfigError(format!("invalid prompt file: {e}")))?;
        let d = parsed.prompt;
        Ok(Self {
            version: d.version,
            system: d.system,
            user: d.user,
        })
    }

    /// Load templates from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::ConfigError` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LlmError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LlmError::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Render `(system_prompt, user_prompt)` for one player message.
    #[must_use]
    pub fn render(
        &self,
        player_id: &str,
        mood: &str,
        history: &[String],
        message: &str,
    ) -> (String, String) {
        let previous = format_history(history);
        let vars = [
            ("player_id", player_id),
            ("mood", mood),
            ("previous_interactions", previous.as_str()),
            ("message", message),
        ];
        (
            render_template(&self.system, &vars),
            render_template(&self.user, &vars),
        )
    }
}
