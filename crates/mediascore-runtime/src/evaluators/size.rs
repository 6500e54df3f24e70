//! Size compliance evaluator.
//!
//! Images: a text-only judgment of measured dimensions against the target
//! (when dimensions are known), then the pixel heuristic. There is no
//! vision step; the image itself adds nothing over its dimensions.
//!
//! Video: frames are never decoded, so the model judges square-crop
//! feasibility from the description and the fallback is a neutral 50.

use mediascore_core::heuristics::NEUTRAL_SIZE_SCORE;
use mediascore_core::{Criterion, MediaKind};

use super::traits::{CriterionEvaluator, EvaluationInput};
use crate::resilience::CascadePlan;

#[derive(Debug, Default, Clone, Copy)]
pub struct SizeComplianceEvaluator;

impl CriterionEvaluator for SizeComplianceEvaluator {
    fn criterion(&self) -> Criterion {
        Criterion::SizeCompliance
    }

    fn plan(&self, input: &EvaluationInput<'_>) -> CascadePlan {
        let base = input.request(self.criterion());
        let target = input.config.size_target;

        match input.asset.media_kind {
            MediaKind::Video => {
                let mut request = base
                    .with_input("media_kind", "video")
                    .with_input("prompt", input.asset.prompt.as_str())
                    .with_input("target_width", target.width)
                    .with_input("target_height", target.height);
                if let Some(mime) = input.probe.mime_type.as_deref() {
                    request = request.with_input("mime_type", mime);
                }
                CascadePlan::builder()
                    .text(request, input.config.text)
                    .constant(NEUTRAL_SIZE_SCORE)
            }
            MediaKind::Image => match input.probe.dimensions() {
                Some((width, height)) => {
                    let request = base
                        .with_input("width", width)
                        .with_input("height", height)
                        .with_input("target_width", target.width)
                        .with_input("target_height", target.height);
                    CascadePlan::builder()
                        .text(request, input.config.text)
                        .heuristic()
                }
                None => CascadePlan::builder().heuristic(),
            },
        }
    }
}
