//! Resilience patterns for mediascore-runtime.
//!
//! Per-criterion fallback cascades: ordered strategies with per-step
//! deadlines, an optional overall deadline and a terminal step that
//! cannot fail.

mod cascade;

pub use cascade::{
    Attempt, AttemptOutcome, CascadeBuilder, CascadeOutcome, CascadePlan, CascadeRunner, Strategy,
    StrategyKind,
};
