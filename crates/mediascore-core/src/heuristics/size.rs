//! Size Compliance heuristic
//!
//! **Question**: How close are the pixel dimensions to the delivery target?
//!
//! Each axis scores `100 - min(100, |actual - target| / target * 100)`;
//! the two axes are averaged. Unknown dimensions and video score a neutral 50.

use serde::{Deserialize, Serialize};

use crate::types::{clamp_score, MediaKind};

/// Neutral score used whenever no pixel data is available.
pub const NEUTRAL_SIZE_SCORE: f64 = 50.0;

/// Target delivery dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeTarget {
    pub width: u32,
    pub height: u32,
}

impl Default for SizeTarget {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
        }
    }
}

/// Score dimensions against the default 1024x1024 target.
pub fn size_heuristic(width: u32, height: u32) -> f64 {
    size_heuristic_for(Some((width, height)), SizeTarget::default())
}

/// Score optional dimensions against an explicit target.
pub fn size_heuristic_for(dimensions: Option<(u32, u32)>, target: SizeTarget) -> f64 {
    let Some((width, height)) = dimensions else {
        return NEUTRAL_SIZE_SCORE;
    };
    if width == 0 || height == 0 || target.width == 0 || target.height == 0 {
        return NEUTRAL_SIZE_SCORE;
    }

    let w = axis_score(width, target.width);
    let h = axis_score(height, target.height);
    clamp_score((w + h) / 2.0)
}

/// Size heuristic that also accounts for media kind.
pub fn size_heuristic_for_media(
    kind: MediaKind,
    dimensions: Option<(u32, u32)>,
    target: SizeTarget,
) -> f64 {
    match kind {
        MediaKind::Video => NEUTRAL_SIZE_SCORE,
        MediaKind::Image => size_heuristic_for(dimensions, target),
    }
}

fn axis_score(actual: u32, target: u32) -> f64 {
    let deviation = (f64::from(actual) - f64::from(target)).abs() / f64::from(target) * 100.0;
    100.0 - deviation.min(100.0)
}
