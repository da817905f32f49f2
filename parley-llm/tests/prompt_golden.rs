//! Dialogue Prompt — Golden Test Set.
//!
//! Curated player situations with strings the rendered prompt must (and
//! must not) contain. These run offline; no backend is called.

use parley_llm::prompt::{self, DialoguePrompt};

/// A golden test case for prompt rendering.
struct GoldenCase {
    name: &'static str,
    player_id: &'static str,
    mood: &'static str,
    history: Vec<&'static str>,
    message: &'static str,
    /// Strings that MUST appear in the rendered user prompt.
    must_contain: Vec<&'static str>,
    /// Strings that MUST NOT appear in the rendered user prompt.
    must_not_contain: Vec<&'static str>,
}

fn golden_cases() -> Vec<GoldenCase> {
    vec![
        // First contact: nothing to recall yet.
        GoldenCase {
            name: "first_greeting",
            player_id: "1",
            mood: "friendly",
            history: vec![],
            message: "Hello there, thank you!",
            must_contain: vec![
                "- Player's current mood: friendly (Player 1)",
                "- Player 1 just said: \"Hello there, thank you!\"",
            ],
            must_not_contain: vec!["1. Player:"],
        },
        // A returning, irritated customer with a full window.
        GoldenCase {
            name: "angry_regular_full_window",
            player_id: "42",
            mood: "angry",
            history: vec![
                "Where is my sword?",
                "You said it would be ready.",
                "This is useless.",
            ],
            message: "I want my money back",
            must_contain: vec![
                "(Player 42)",
                "1. Player: \"Where is my sword?\"",
                "2. Player: \"You said it would be ready.\"",
                "3. Player: \"This is useless.\"",
            ],
            must_not_contain: vec!["4. Player:"],
        },
        // Player text that looks like a placeholder is passed through as-is.
        GoldenCase {
            name: "message_with_braces",
            player_id: "3",
            mood: "neutral",
            history: vec!["hm"],
            message: "What does {rune} mean?",
            must_contain: vec!["just said: \"What does {rune} mean?\"", "1. Player: \"hm\""],
            must_not_contain: vec!["{previous_interactions}", "{player_id}"],
        },
        // Earlier utterances that look like placeholders stay verbatim.
        GoldenCase {
            name: "history_with_braces",
            player_id: "1",
            mood: "neutral",
            history: vec!["what does {message} mean?", "and {mood}?"],
            message: "Tell me about the old rune stones",
            must_contain: vec![
                "1. Player: \"what does {message} mean?\"",
                "2. Player: \"and {mood}?\"",
                "just said: \"Tell me about the old rune stones\"",
            ],
            must_not_contain: vec!["what does Tell me", "and neutral?"],
        },
    ]
}

#[test]
fn golden_prompts_render_as_expected() {
    let templates = DialoguePrompt::builtin();

    for case in golden_cases() {
        let history: Vec<String> = case.history.iter().map(|s| (*s).to_string()).collect();
        let (system, user) = templates.render(case.player_id, case.mood, &history, case.message);

        assert_eq!(system, prompt::NPC_DIALOGUE_SYSTEM, "[{}] system prompt", case.name);
        for needle in &case.must_contain {
            assert!(
                user.contains(needle),
                "[{}] rendered prompt missing {needle:?}:\n{user}",
                case.name
            );
        }
        for needle in &case.must_not_contain {
            assert!(
                !user.contains(needle),
                "[{}] rendered prompt unexpectedly contains {needle:?}",
                case.name
            );
        }
    }
}

#[test]
fn all_prompts_demand_short_in_character_replies() {
    let templates = DialoguePrompt::builtin();
    assert!(templates.system.contains("in character"));
    assert!(templates.user.contains("1-2 sentences"));
}

#[test]
fn shipped_prompt_file_matches_builtin_rendering() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/v1/npc_dialogue.toml");
    let shipped = DialoguePrompt::from_file(path).expect("shipped prompt parses");
    assert_eq!(shipped.version, "1.0");

    let history = vec!["Can you help me?".to_string()];
    let from_file = shipped.render("9", "neutral", &history, "Where are the mines?");
    let builtin = DialoguePrompt::builtin().render("9", "neutral", &history, "Where are the mines?");
    assert_eq!(from_file, builtin);
}
