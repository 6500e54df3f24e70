//! Criterion evaluator trait and shared inputs.

use serde_json::{Map, Value as JsonValue};

use mediascore_core::{AssetRef, Criterion, MediaProbe};

use crate::config::RuntimeConfig;
use crate::prompts;
use crate::providers::InlineImage;
use crate::resilience::{CascadeBuilder, CascadePlan};
use crate::scoring::ScoringRequest;

/// Everything an evaluator may read for one asset.
///
/// Built once per evaluation and shared read-only by all four evaluators.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    pub asset: &'a AssetRef,
    pub probe: &'a MediaProbe,
    /// Encoded image, present only for image assets a vision model can read
    pub image: Option<&'a InlineImage>,
    pub config: &'a RuntimeConfig,
}

impl<'a> EvaluationInput<'a> {
    /// Base request for a criterion with the criteria text for this media kind.
    pub fn request(&self, criterion: Criterion) -> ScoringRequest {
        ScoringRequest::new(
            criterion.task_name(),
            prompts::criteria_text(criterion, self.asset.media_kind),
        )
    }

    /// Brand attributes as a JSON object; empty when no brand is attached.
    pub fn brand_json(&self) -> JsonValue {
        let attributes: Map<String, JsonValue> = self
            .asset
            .brand
            .as_ref()
            .map(|brand| {
                brand
                    .attributes()
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), JsonValue::from(value)))
                    .collect()
            })
            .unwrap_or_default();
        JsonValue::Object(attributes)
    }

    /// Add the vision step (when an image is available) and the text step.
    ///
    /// Both steps share the same structured input; the vision request also
    /// carries the image.
    pub fn model_steps(&self, request: ScoringRequest) -> CascadeBuilder {
        let builder = CascadePlan::builder();
        let builder = match self.image {
            Some(image) => builder.vision(request.clone().with_image(image.clone()), self.config.vision),
            None => builder,
        };
        builder.text(request, self.config.text)
    }
}

/// Trait for the four criterion evaluators.
///
/// # Isolation Contract
/// Each evaluator only describes its cascade:
/// - No shared mutable state between evaluators
/// - No access to other criteria's scores
/// - The same input always produces the same plan
pub trait CriterionEvaluator: Send + Sync {
    /// The criterion this evaluator scores.
    fn criterion(&self) -> Criterion;

    /// Ordered strategies for this criterion and asset.
    fn plan(&self, input: &EvaluationInput<'_>) -> CascadePlan;

    /// Weight in the composite score.
    fn weight(&self) -> f64 {
        self.criterion().weight()
    }
}
