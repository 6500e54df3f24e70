//! Subject Adherence heuristic
//!
//! **Question**: Does the prompt name a clear subject, and does it relate to the brand?
//!
//! `min(8, unique salient words) * 10`, plus 5 for every salient word that
//! appears inside the lowercased brand name.

use crate::types::clamp_score;

use super::patterns::salient_words;

const MAX_COUNTED_WORDS: usize = 8;
const WORD_POINTS: f64 = 10.0;
const BRAND_HIT_POINTS: f64 = 5.0;

pub fn subject_heuristic(prompt: &str, brand_name: &str) -> f64 {
    let words = salient_words(prompt);
    let base = words.len().min(MAX_COUNTED_WORDS) as f64 * WORD_POINTS;

    let brand = brand_name.to_lowercase();
    let hits = words.iter().filter(|w| brand.contains(w.as_str())).count() as f64;

    clamp_score(base + hits * BRAND_HIT_POINTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salient_prompt_beats_noise() {
        let rich = subject_heuristic("a beautiful red shoe design", "Shoe");
        let poor = subject_heuristic("xyz", "Shoe");
        assert!(rich > poor);
        // beautiful, shoe, design = 30, plus one brand hit
        assert_eq!(rich, 35.0);
        assert_eq!(poor, 0.0);
    }

    #[test]
    fn test_word_count_caps_at_eight() {
        let prompt = "alpha bravo charlie delta echoes foxtrot golfer hotel india juliet";
        assert_eq!(subject_heuristic(prompt, ""), 80.0);
    }

    #[test]
    fn test_empty_brand_adds_nothing() {
        // every word is a substring of "", never true for non-empty words
        assert_eq!(subject_heuristic("sneaker launch", ""), 20.0);
    }

    #[test]
    fn test_clamped_at_100() {
        let prompt = "acme rocket acme sled trap anvil magnet glue paint dynamite";
        let brand = "acme rocket sled trap anvil magnet glue paint dynamite";
        assert_eq!(subject_heuristic(prompt, brand), 100.0);
    }
}
