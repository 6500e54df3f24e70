//! Creativity evaluator: vision (image + prompt), text (prompt), heuristic.

use mediascore_core::Criterion;

use super::traits::{CriterionEvaluator, EvaluationInput};
use crate::resilience::CascadePlan;

#[derive(Debug, Default, Clone, Copy)]
pub struct CreativityEvaluator;

impl CriterionEvaluator for CreativityEvaluator {
    fn criterion(&self) -> Criterion {
        Criterion::Creativity
    }

    fn plan(&self, input: &EvaluationInput<'_>) -> CascadePlan {
        let request = input
            .request(self.criterion())
            .with_input("prompt", input.asset.prompt.as_str());

        input.model_steps(request).heuristic()
    }
}
