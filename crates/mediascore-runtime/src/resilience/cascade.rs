//! Fallback cascade: an ordered list of strategies tried one at a time.
//!
//! Every plan ends in a terminal strategy (heuristic or constant) that
//! cannot fail, so running a plan always yields exactly one score. Model
//! steps run strictly in order; a failed step is logged and recorded in the
//! attempt trace, never returned.

use std::time::Duration;

use serde::{Serialize, Serializer};
use tokio::time::Instant;

use mediascore_core::{Criterion, CriterionScore, HeuristicContext};

use crate::config::StepConfig;
use crate::scoring::{ModelScoringClient, ScoringError, ScoringErrorKind, ScoringRequest};

/// Tag for a strategy, as recorded in attempt traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Vision,
    Text,
    Heuristic,
    Constant,
}

/// One strategy in a cascade.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Model call with an inline image
    Vision {
        request: ScoringRequest,
        step: StepConfig,
    },

    /// Text-only model call
    Text {
        request: ScoringRequest,
        step: StepConfig,
    },

    /// Deterministic heuristic for the criterion
    Heuristic,

    /// Fixed neutral value
    Constant { value: f64 },
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Vision { .. } => StrategyKind::Vision,
            Strategy::Text { .. } => StrategyKind::Text,
            Strategy::Heuristic => StrategyKind::Heuristic,
            Strategy::Constant { .. } => StrategyKind::Constant,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Strategy::Heuristic | Strategy::Constant { .. })
    }
}

/// Builder for the model steps of a plan.
///
/// A plan only comes into existence once a terminal step is chosen.
#[derive(Debug, Default)]
pub struct CascadeBuilder {
    steps: Vec<Strategy>,
}

impl CascadeBuilder {
    /// Add a vision step, unless disabled.
    pub fn vision(mut self, request: ScoringRequest, step: StepConfig) -> Self {
        if step.enabled {
            self.steps.push(Strategy::Vision { request, step });
        }
        self
    }

    /// Add a text step, unless disabled.
    pub fn text(mut self, request: ScoringRequest, step: StepConfig) -> Self {
        if step.enabled {
            self.steps.push(Strategy::Text { request, step });
        }
        self
    }

    /// Finish with the criterion's heuristic.
    pub fn heuristic(mut self) -> CascadePlan {
        self.steps.push(Strategy::Heuristic);
        CascadePlan { steps: self.steps }
    }

    /// Finish with a fixed value.
    pub fn constant(mut self, value: f64) -> CascadePlan {
        self.steps.push(Strategy::Constant { value });
        CascadePlan { steps: self.steps }
    }
}

/// Ordered strategies for one criterion. The last step is always terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadePlan {
    steps: Vec<Strategy>,
}

impl CascadePlan {
    pub fn builder() -> CascadeBuilder {
        CascadeBuilder::default()
    }

    pub fn steps(&self) -> &[Strategy] {
        &self.steps
    }

    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.steps.iter().map(Strategy::kind).collect()
    }
}

/// What happened to one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded,
    Failed(ScoringErrorKind),
    /// Not run: no model client, or the evaluation deadline had passed
    Skipped,
}

/// Trace entry for one step of a cascade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    pub kind: StrategyKind,
    pub outcome: AttemptOutcome,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl Attempt {
    fn skipped(kind: StrategyKind) -> Self {
        Self {
            kind,
            outcome: AttemptOutcome::Skipped,
            elapsed: Duration::ZERO,
        }
    }
}

fn as_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

/// Result of running one plan.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub score: CriterionScore,
    pub attempts: Vec<Attempt>,
}

/// Runs cascade plans for one asset.
///
/// Holds only shared references; several runners (or one runner across
/// concurrent criteria) never share mutable state.
#[derive(Debug, Clone, Copy)]
pub struct CascadeRunner<'a> {
    client: Option<&'a ModelScoringClient>,
    heuristics: HeuristicContext<'a>,
    deadline: Option<Instant>,
}

impl<'a> CascadeRunner<'a> {
    pub fn new(client: Option<&'a ModelScoringClient>, heuristics: HeuristicContext<'a>) -> Self {
        Self {
            client,
            heuristics,
            deadline: None,
        }
    }

    /// Bound every model step by an overall deadline.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Run a plan to completion.
    pub async fn run(&self, criterion: Criterion, plan: &CascadePlan) -> CascadeOutcome {
        let mut attempts = Vec::with_capacity(plan.steps.len());

        for strategy in &plan.steps {
            let kind = strategy.kind();
            let started = Instant::now();

            let result = match strategy {
                Strategy::Vision { request, step } | Strategy::Text { request, step } => {
                    let Some(client) = self.client else {
                        tracing::debug!(
                            criterion = %criterion,
                            strategy = ?kind,
                            "No scoring client configured, skipping model step"
                        );
                        attempts.push(Attempt::skipped(kind));
                        continue;
                    };
                    if self.deadline_passed() {
                        tracing::debug!(
                            criterion = %criterion,
                            strategy = ?kind,
                            "Evaluation deadline passed, skipping model step"
                        );
                        attempts.push(Attempt::skipped(kind));
                        continue;
                    }
                    self.run_model_step(client, criterion, kind, request, step)
                        .await
                }
                Strategy::Heuristic => Ok(CriterionScore::heuristic(
                    self.heuristics.score(criterion),
                )),
                Strategy::Constant { value } => Ok(CriterionScore::heuristic(*value)),
            };

            let elapsed = started.elapsed();
            match result {
                Ok(score) => {
                    tracing::debug!(
                        criterion = %criterion,
                        strategy = ?kind,
                        score = score.value,
                        "Criterion scored"
                    );
                    attempts.push(Attempt {
                        kind,
                        outcome: AttemptOutcome::Succeeded,
                        elapsed,
                    });
                    return CascadeOutcome { score, attempts };
                }
                Err(e) => {
                    attempts.push(Attempt {
                        kind,
                        outcome: AttemptOutcome::Failed(e.kind()),
                        elapsed,
                    });
                }
            }
        }

        // Plans always end in a terminal step; kept for completeness.
        CascadeOutcome {
            score: CriterionScore::heuristic(self.heuristics.score(criterion)),
            attempts,
        }
    }

    async fn run_model_step(
        &self,
        client: &ModelScoringClient,
        criterion: Criterion,
        kind: StrategyKind,
        request: &ScoringRequest,
        step: &StepConfig,
    ) -> Result<CriterionScore, ScoringError> {
        let mut deadline = Instant::now() + step.timeout;
        if let Some(overall) = self.deadline {
            deadline = deadline.min(overall);
        }

        tracing::debug!(
            criterion = %criterion,
            strategy = ?kind,
            timeout = ?step.timeout,
            retries = step.retries,
            "Attempting model step"
        );

        client
            .score_until(request, step.retries, deadline)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    criterion = %criterion,
                    strategy = ?kind,
                    error = %e,
                    "Model step failed, falling back"
                );
            })
    }

    fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
