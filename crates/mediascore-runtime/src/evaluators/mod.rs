//! Criterion evaluators.
//!
//! Each evaluator binds one criterion's inputs to a cascade plan. The
//! plans are run by [`crate::resilience::CascadeRunner`]; evaluators never
//! call a model themselves.

mod creativity;
mod mood;
mod size;
mod subject;
mod traits;

pub use creativity::CreativityEvaluator;
pub use mood::MoodConsistencyEvaluator;
pub use size::SizeComplianceEvaluator;
pub use subject::SubjectAdherenceEvaluator;
pub use traits::{CriterionEvaluator, EvaluationInput};

use mediascore_core::Criterion;

/// The built-in evaluator for a criterion.
pub fn evaluator_for(criterion: Criterion) -> &'static dyn CriterionEvaluator {
    match criterion {
        Criterion::SizeCompliance => &SizeComplianceEvaluator,
        Criterion::SubjectAdherence => &SubjectAdherenceEvaluator,
        Criterion::Creativity => &CreativityEvaluator,
        Criterion::MoodConsistency => &MoodConsistencyEvaluator,
    }
}
