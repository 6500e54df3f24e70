//! Creativity heuristic
//!
//! **Question**: How much deliberate creative direction does the prompt carry?
//!
//! Rewards prompt length (capped at 200 characters), comma-separated
//! modifiers and style adjectives.

use crate::types::clamp_score;

use super::patterns::count_style_adjectives;

const MAX_COUNTED_CHARS: usize = 200;

pub fn creativity_heuristic(prompt: &str) -> f64 {
    let len = prompt.chars().count().min(MAX_COUNTED_CHARS) as f64;
    let commas = prompt.matches(',').count() as f64;
    let adjectives = count_style_adjectives(prompt) as f64;

    clamp_score(len / 2.0 * 0.4 + commas * 10.0 + adjectives * 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prompt_scores_zero() {
        assert_eq!(creativity_heuristic(""), 0.0);
    }

    #[test]
    fn test_components_add_up() {
        // 24 chars -> 4.8, one comma -> 10, two adjectives -> 24
        let prompt = "soft light, dramatic sky";
        assert_eq!(prompt.len(), 24);
        let expected = 24.0 / 2.0 * 0.4 + 10.0 + 24.0;
        assert!((creativity_heuristic(prompt) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_length_is_capped() {
        let long = "x".repeat(10_000);
        assert!((creativity_heuristic(&long) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_many_commas_clamp_to_100() {
        assert_eq!(creativity_heuristic(",,,,,,,,,,,,"), 100.0);
    }
}
