//! Shared word lists and patterns for the prompt heuristics.

use lazy_static::lazy_static;
use regex::Regex;

/// Style adjectives that signal a deliberate, creative prompt.
pub const STYLE_ADJECTIVES: [&str; 6] = [
    "beautiful",
    "dramatic",
    "hyperrealistic",
    "soft",
    "detailed",
    "colorful",
];

/// Words that carry an explicit mood.
pub const MOOD_WORDS: [&str; 8] = [
    "happy",
    "sad",
    "dramatic",
    "hopeful",
    "serene",
    "moody",
    "vintage",
    "futuristic",
];

lazy_static! {
    /// Salient words: runs of at least four ASCII letters (applied to lowercased text).
    pub static ref SALIENT_WORD: Regex = Regex::new(r"[a-z]{4,}").unwrap();

    /// Whole-word, case-insensitive match of any style adjective.
    pub static ref STYLE_ADJECTIVE: Regex = Regex::new(&format!(
        r"(?i)\b({})\b",
        STYLE_ADJECTIVES.join("|")
    ))
    .unwrap();
}

/// Unique salient words of `text`, in first-seen order.
pub fn salient_words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut seen: Vec<String> = Vec::new();
    for m in SALIENT_WORD.find_iter(&lower) {
        if !seen.iter().any(|w| w == m.as_str()) {
            seen.push(m.as_str().to_string());
        }
    }
    seen
}

/// Number of style adjective occurrences in `text`.
pub fn count_style_adjectives(text: &str) -> usize {
    STYLE_ADJECTIVE.find_iter(text).count()
}

/// Number of distinct mood words that appear anywhere in `text`.
pub fn count_mood_words(text: &str) -> usize {
    let lower = text.to_lowercase();
    MOOD_WORDS.iter().filter(|w| lower.contains(*w)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salient_words_dedup_and_length() {
        let words = salient_words("A red SHOE, a shoe, the Design!");
        assert_eq!(words, vec!["shoe", "design"]);
    }

    #[test]
    fn test_style_adjectives_whole_word() {
        assert_eq!(count_style_adjectives("Soft light, DETAILED, softer edges"), 2);
    }

    #[test]
    fn test_mood_words_count_each_word_once() {
        assert_eq!(count_mood_words("happy happy Serene"), 2);
        assert_eq!(count_mood_words("unhappy"), 1);
        assert_eq!(count_mood_words(""), 0);
    }
}
