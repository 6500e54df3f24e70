//! Subject adherence evaluator.
//!
//! Vision (image + prompt + brand), then text (prompt + brand), then the
//! salient-word heuristic.

use mediascore_core::Criterion;

use super::traits::{CriterionEvaluator, EvaluationInput};
use crate::resilience::CascadePlan;

#[derive(Debug, Default, Clone, Copy)]
pub struct SubjectAdherenceEvaluator;

impl CriterionEvaluator for SubjectAdherenceEvaluator {
    fn criterion(&self) -> Criterion {
        Criterion::SubjectAdherence
    }

    fn plan(&self, input: &EvaluationInput<'_>) -> CascadePlan {
        let request = input
            .request(self.criterion())
            .with_input("prompt", input.asset.prompt.as_str())
            .with_input("brand", input.brand_json());

        input.model_steps(request).heuristic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::providers::InlineImage;
    use crate::resilience::{Strategy, StrategyKind};
    use mediascore_core::{AssetRef, BrandProfile, MediaProbe};

    #[test]
    fn test_plan_carries_brand_to_both_model_steps() {
        let brand = BrandProfile {
            name: Some("Shoe Co".to_string()),
            voice: Some("playful".to_string()),
            colors: Some("  ".to_string()),
            ..Default::default()
        };
        let asset = AssetRef::image("shoe.png", "a red shoe").with_brand(brand);
        let probe = MediaProbe::default();
        let image = InlineImage::encode(b"png", "image/png");
        let config = RuntimeConfig::default();
        let input = EvaluationInput {
            asset: &asset,
            probe: &probe,
            image: Some(&image),
            config: &config,
        };

        let plan = SubjectAdherenceEvaluator.plan(&input);
        assert_eq!(
            plan.kinds(),
            vec![StrategyKind::Vision, StrategyKind::Text, StrategyKind::Heuristic]
        );

        for step in &plan.steps()[..2] {
            let request = match step {
                Strategy::Vision { request, .. } | Strategy::Text { request, .. } => request,
                other => panic!("Expected model step, got {:?}", other),
            };
            assert_eq!(request.task_name, "subject_adherence");
            assert_eq!(request.structured_input["brand"]["name"], "Shoe Co");
            assert_eq!(request.structured_input["brand"]["voice"], "playful");
            assert!(request.structured_input["brand"].get("colors").is_none());
        }

        match &plan.steps()[0] {
            Strategy::Vision { request, step } => {
                assert_eq!(request.image_payload.as_ref(), Some(&image));
                assert_eq!(*step, config.vision);
            }
            other => panic!("Expected vision step, got {:?}", other),
        }
    }

    #[test]
    fn test_no_brand_sends_empty_object() {
        let asset = AssetRef::image("a.png", "a red shoe");
        let probe = MediaProbe::default();
        let config = RuntimeConfig::default();
        let input = EvaluationInput {
            asset: &asset,
            probe: &probe,
            image: None,
            config: &config,
        };

        let plan = SubjectAdherenceEvaluator.plan(&input);
        assert_eq!(plan.kinds(), vec![StrategyKind::Text, StrategyKind::Heuristic]);
        match &plan.steps()[0] {
            Strategy::Text { request, .. } => {
                assert_eq!(request.structured_input["brand"], serde_json::json!({}));
            }
            other => panic!("Expected text step, got {:?}", other),
        }
    }
}
