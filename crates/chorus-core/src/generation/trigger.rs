//! Image-mode trigger vocabulary.

use serde::{Deserialize, Serialize};

/// Substrings that route a submission to image generation.
pub const DEFAULT_TRIGGER_WORDS: &[&str] = &[
    "generate image",
    "draw",
    "picture",
    "tasveer",
    "image banao",
    "bana k do",
];

/// Case-insensitive substring vocabulary.
///
/// Matching is plain substring search, not whole-word: "drawer" contains
/// "draw" and therefore triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TriggerVocabulary {
    words: Vec<String>,
}

impl TriggerVocabulary {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// True if `input` contains any trigger word, ignoring case.
    pub fn matches(&self, input: &str) -> bool {
        let input = input.to_lowercase();
        self.words.iter().any(|word| input.contains(word.as_str()))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for TriggerVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_WORDS)
    }
}

impl From<Vec<String>> for TriggerVocabulary {
    fn from(words: Vec<String>) -> Self {
        Self::new(words)
    }
}

impl From<TriggerVocabulary> for Vec<String> {
    fn from(vocabulary: TriggerVocabulary) -> Self {
        vocabulary.words
    }
}
