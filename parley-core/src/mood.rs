//! Keyword mood classifier.
//!
//! Counts how many friendly and angry keywords occur as substrings of the
//! lower-cased message. There is no tokenization: `"hi"` matches inside
//! `"this"`, and `"thanks"` scores for both `"thank"` and `"thanks"`.
//!
//! Decision rule, first match wins:
//!
//! 1. `angry > friendly` and `angry > 0` → [`Mood::Angry`]
//! 2. `friendly > angry` and `friendly > 0` → [`Mood::Friendly`]
//! 3. otherwise the mood decays to [`Mood::Neutral`]

use crate::types::Mood;

/// Keywords that push a player toward [`Mood::Friendly`].
pub const FRIENDLY_KEYWORDS: &[&str] = &[
    "hello",
    "hi",
    "thank",
    "please",
    "help",
    "appreciate",
    "kind",
    "wonderful",
    "great",
    "best",
    "grateful",
    "thanks",
    "good",
];

/// Keywords that push a player toward [`Mood::Angry`].
pub const ANGRY_KEYWORDS: &[&str] = &[
    "useless",
    "hate",
    "terrible",
    "worst",
    "stupid",
    "frustrated",
    "angry",
    "broken",
    "incompetent",
    "awful",
    "horrible",
    "sucks",
];

/// Raw keyword counts for one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoodScore {
    /// Number of distinct friendly keywords found.
    pub friendly: usize,
    /// Number of distinct angry keywords found.
    pub angry: usize,
}

/// Count keyword hits in `text`.
#[must_use]
pub fn score(text: &str) -> MoodScore {
    let lowered = text.to_lowercase();
    let hits = |keywords: &[&str]| keywords.iter().filter(|k| lowered.contains(*k)).count();

    MoodScore {
        friendly: hits(FRIENDLY_KEYWORDS),
        angry: hits(ANGRY_KEYWORDS),
    }
}

/// Classify `text` given the player's `current` mood.
///
/// Pure function of its inputs.
#[must_use]
pub fn classify(text: &str, current: Mood) -> Mood {
    let MoodScore { friendly, angry } = score(text);

    if angry > friendly && angry > 0 {
        Mood::Angry
    } else if friendly > angry && friendly > 0 {
        Mood::Friendly
    } else if current != Mood::Neutral {
        Mood::Neutral
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friendly_message() {
        assert_eq!(classify("hello there, thank you!", Mood::Neutral), Mood::Friendly);
    }

    #[test]
    fn angry_message() {
        assert_eq!(classify("you are useless and broken", Mood::Friendly), Mood::Angry);
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(classify("The Ale Is HORRIBLE", Mood::Neutral), Mood::Angry);
    }

    #[test]
    fn substring_matches_count() {
        // "this" contains "hi".
        assert_eq!(score("this"), MoodScore { friendly: 1, angry: 0 });
        // "thanks" contains both "thank" and "thanks".
        assert_eq!(score("thanks"), MoodScore { friendly: 2, angry: 0 });
    }

    #[test]
    fn repeated_keyword_counts_once() {
        assert_eq!(score("hate hate hate").angry, 1);
    }

    #[test]
    fn tie_decays_toward_neutral() {
        // one friendly ("good"), one angry ("awful")
        let text = "good but awful";
        assert_eq!(score(text), MoodScore { friendly: 1, angry: 1 });
        assert_eq!(classify(text, Mood::Angry), Mood::Neutral);
        assert_eq!(classify(text, Mood::Friendly), Mood::Neutral);
        assert_eq!(classify(text, Mood::Neutral), Mood::Neutral);
    }

    #[test]
    fn no_keywords_decays_toward_neutral() {
        assert_eq!(classify("where is the smithy?", Mood::Angry), Mood::Neutral);
        assert_eq!(classify("where is the smithy?", Mood::Friendly), Mood::Neutral);
        assert_eq!(classify("where is the smithy?", Mood::Neutral), Mood::Neutral);
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(score(""), MoodScore::default());
    }

    #[test]
    fn majority_wins_over_minority() {
        // friendly: "great", "best"; angry: "sucks"
        assert_eq!(classify("great stuff, the best, but the ale sucks", Mood::Angry), Mood::Friendly);
    }
}
