//! Deterministic heuristic scorers.
//!
//! Each heuristic answers one criterion from local signals only: pixel
//! dimensions and prompt text. They never perform I/O, never fail and always
//! return a value in `[0, 100]`. In the runtime they are the terminal stage
//! of every criterion's fallback cascade.

mod creativity;
mod mood;
pub mod patterns;
mod size;
mod subject;

pub use creativity::creativity_heuristic;
pub use mood::mood_heuristic;
pub use size::{
    size_heuristic, size_heuristic_for, size_heuristic_for_media, SizeTarget, NEUTRAL_SIZE_SCORE,
};
pub use subject::subject_heuristic;

use crate::media::MediaProbe;
use crate::types::{AssetRef, Criterion, MediaKind};

/// Everything the heuristics may look at for one asset.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicContext<'a> {
    pub media_kind: MediaKind,
    pub dimensions: Option<(u32, u32)>,
    pub prompt: &'a str,
    pub brand_name: &'a str,
    pub size_target: SizeTarget,
}

impl<'a> HeuristicContext<'a> {
    pub fn new(asset: &'a AssetRef, probe: &MediaProbe, size_target: SizeTarget) -> Self {
        Self {
            media_kind: asset.media_kind,
            dimensions: probe.dimensions(),
            prompt: &asset.prompt,
            brand_name: asset.brand_name(),
            size_target,
        }
    }

    /// Heuristic score for a criterion.
    pub fn score(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::SizeCompliance => {
                size_heuristic_for_media(self.media_kind, self.dimensions, self.size_target)
            }
            Criterion::SubjectAdherence => subject_heuristic(self.prompt, self.brand_name),
            Criterion::Creativity => creativity_heuristic(self.prompt),
            Criterion::MoodConsistency => mood_heuristic(self.prompt),
        }
    }
}
