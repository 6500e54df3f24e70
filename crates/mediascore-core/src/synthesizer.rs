//! Synthesizer: aggregates the four criterion scores into the final result.
//!
//! The composite is a fixed weighted sum:
//!
//! | Criterion | Weight |
//! |-----------|--------|
//! | Size compliance | 0.25 |
//! | Subject adherence | 0.35 |
//! | Creativity | 0.20 |
//! | Mood consistency | 0.20 |
//!
//! `end_score = round(sum)`, clamped to `[0, 100]`. The weights are not
//! configurable. The result depends only on the four values, never on the
//! order in which criteria finished.

use crate::types::{clamp_score, Criterion, CriterionScores, EvaluationResult};

/// The Synthesizer turns criterion scores into an [`EvaluationResult`].
pub struct Synthesizer;

impl Synthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Build the final, immutable evaluation result.
    pub fn synthesize(&self, scores: CriterionScores) -> EvaluationResult {
        let end_score = self.composite(&scores);

        tracing::debug!(
            size = scores.size_compliance.value,
            subject = scores.subject_adherence.value,
            creativity = scores.creativity.value,
            mood = scores.mood_consistency.value,
            end_score,
            "Synthesized composite score"
        );

        EvaluationResult {
            size_compliance: scores.size_compliance,
            subject_adherence: scores.subject_adherence,
            creativity: scores.creativity,
            mood_consistency: scores.mood_consistency,
            end_score,
        }
    }

    /// Weighted composite of the four criterion values.
    pub fn composite(&self, scores: &CriterionScores) -> u8 {
        let weighted: f64 = Criterion::ALL
            .iter()
            .map(|c| clamp_score(scores.get(*c).value) * c.weight())
            .sum();

        // clamp_score bounds the value to [0, 100], so the cast is lossless
        clamp_score(weighted.round()) as u8
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}
