//! Mood Consistency heuristic
//!
//! **Question**: Does the prompt commit to a recognisable mood?
//!
//! Starts from 40 and adds 15 for each distinct mood word present.

use crate::types::clamp_score;

use super::patterns::count_mood_words;

const BASE: f64 = 40.0;
const PER_MOOD_WORD: f64 = 15.0;

pub fn mood_heuristic(prompt: &str) -> f64 {
    clamp_score(BASE + PER_MOOD_WORD * count_mood_words(prompt) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_mood_words_is_base() {
        assert_eq!(mood_heuristic("a chair"), 40.0);
    }

    #[test]
    fn test_mood_words_add_up() {
        assert_eq!(mood_heuristic("Serene, hopeful morning"), 70.0);
    }

    #[test]
    fn test_clamped_at_100() {
        let prompt = "happy sad dramatic hopeful serene moody vintage futuristic";
        assert_eq!(mood_heuristic(prompt), 100.0);
    }
}
