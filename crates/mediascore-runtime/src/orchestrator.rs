//! Scoring orchestrator for parallel criterion evaluation.
//!
//! The orchestrator evaluates one asset at a time:
//! - Probe the media once and encode the image once
//! - Parallel fan-out to all 4 criteria via tokio::join!
//! - Each criterion runs its own fallback cascade
//! - Deterministic fan-in through the Synthesizer

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tokio::time::Instant;

use mediascore_core::{
    AssetRef, Criterion, CriterionScores, EvaluationResult, HeuristicContext, MediaKind,
    MediaProbe, Synthesizer,
};

use crate::config::{ConfigError, RuntimeConfig};
use crate::evaluators::{evaluator_for, EvaluationInput};
use crate::providers::{InlineImage, LlmProvider, ProviderError, ProviderRegistry};
use crate::resilience::{Attempt, AttemptOutcome, CascadeOutcome, CascadeRunner, StrategyKind};
use crate::scoring::ModelScoringClient;

/// Errors from building the orchestrator.
///
/// Evaluation itself never fails; these only surface at startup.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Result from a reported evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeResult {
    /// The evaluation result
    pub evaluation: EvaluationResult,

    /// Every attempted step per criterion, in order
    pub trace: BTreeMap<Criterion, Vec<Attempt>>,

    /// Wall time for the whole evaluation
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl RuntimeResult {
    /// Number of model steps that were actually started.
    pub fn model_calls(&self) -> usize {
        self.trace
            .values()
            .flatten()
            .filter(|a| matches!(a.kind, StrategyKind::Vision | StrategyKind::Text))
            .filter(|a| a.outcome != AttemptOutcome::Skipped)
            .count()
    }
}

fn as_millis<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

/// The scoring orchestrator.
///
/// # Architecture
/// - Parallel fan-out: all 4 criteria execute concurrently via tokio::join!
/// - Per-criterion cascade: vision -> text -> heuristic, each step bounded
/// - Deterministic fan-in: the Synthesizer computes the weighted composite
/// - No state is kept between calls; each evaluation is independent
pub struct ScoringOrchestrator {
    /// Model client; `None` runs every criterion on its terminal step
    client: Option<ModelScoringClient>,

    /// Configuration
    config: RuntimeConfig,

    /// Synthesizer for the composite
    synthesizer: Synthesizer,
}

impl std::fmt::Debug for ScoringOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringOrchestrator")
            .field("client", &self.client)
            .field("config", &self.config)
            .finish()
    }
}

impl ScoringOrchestrator {
    /// Create an orchestrator with an optional provider.
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, config: RuntimeConfig) -> Self {
        let client = provider.map(|p| {
            ModelScoringClient::new(p).with_completion_config(config.completion_config())
        });

        Self {
            client,
            config,
            synthesizer: Synthesizer::new(),
        }
    }

    /// Create an orchestrator that never calls a model.
    pub fn offline(config: RuntimeConfig) -> Self {
        Self::new(None, config)
    }

    /// Validate configuration and build the provider it names.
    pub fn from_config(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        Self::from_config_with_registry(config, &ProviderRegistry::with_defaults())
    }

    /// Like [`ScoringOrchestrator::from_config`], with a custom registry.
    pub fn from_config_with_registry(
        config: RuntimeConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;

        let provider = match &config.provider {
            Some(settings) => {
                let factory_config = settings.factory_config();
                registry.validate(&settings.provider_type, &factory_config)?;
                let provider = registry.create(&settings.provider_type, &factory_config)?;
                tracing::info!(provider = provider.name(), "Model provider configured");
                Some(provider)
            }
            None => {
                tracing::info!("No model provider configured, using heuristics only");
                None
            }
        };

        Ok(Self::new(provider, config))
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Whether model steps can run at all.
    pub fn has_model(&self) -> bool {
        self.client.is_some()
    }

    /// Provider health, or `None` when no model is configured.
    pub async fn check_provider(&self) -> Option<bool> {
        match &self.client {
            Some(client) => Some(client.health_check().await),
            None => None,
        }
    }

    /// Evaluate one asset.
    ///
    /// Always returns a complete result: model failures degrade individual
    /// criteria to their fallbacks.
    pub async fn evaluate(&self, asset: &AssetRef) -> EvaluationResult {
        self.evaluate_with_report(asset).await.evaluation
    }

    /// Evaluate one asset and keep the per-criterion attempt trace.
    ///
    /// # Execution Flow
    /// 1. Probe media (dimensions, MIME) and encode the image once
    /// 2. Fan-out: run all 4 criterion cascades in parallel
    /// 3. Fan-in: synthesize the composite (deterministic)
    pub async fn evaluate_with_report(&self, asset: &AssetRef) -> RuntimeResult {
        let started = Instant::now();
        let deadline = self.config.evaluation_deadline.map(|d| started + d);

        let probe = MediaProbe::for_asset(asset);
        let image = self.inline_image(asset, &probe);

        let input = EvaluationInput {
            asset,
            probe: &probe,
            image: image.as_ref(),
            config: &self.config,
        };
        let runner = CascadeRunner::new(
            self.client.as_ref(),
            HeuristicContext::new(asset, &probe, self.config.size_target),
        )
        .with_deadline(deadline);

        // Fan-out: parallel criterion evaluation
        let (size, subject, creativity, mood) = tokio::join!(
            evaluate_criterion(&runner, &input, Criterion::SizeCompliance),
            evaluate_criterion(&runner, &input, Criterion::SubjectAdherence),
            evaluate_criterion(&runner, &input, Criterion::Creativity),
            evaluate_criterion(&runner, &input, Criterion::MoodConsistency),
        );

        let trace = BTreeMap::from([
            (Criterion::SizeCompliance, size.attempts),
            (Criterion::SubjectAdherence, subject.attempts),
            (Criterion::Creativity, creativity.attempts),
            (Criterion::MoodConsistency, mood.attempts),
        ]);

        // Fan-in: deterministic synthesis
        let evaluation = self.synthesizer.synthesize(CriterionScores {
            size_compliance: size.score,
            subject_adherence: subject.score,
            creativity: creativity.score,
            mood_consistency: mood.score,
        });

        let elapsed = started.elapsed();
        tracing::info!(
            location = %asset.location,
            end_score = evaluation.end_score,
            elapsed = ?elapsed,
            "Evaluation complete"
        );

        RuntimeResult {
            evaluation,
            trace,
            elapsed,
        }
    }

    /// Inline image for vision steps, when one can be sent.
    fn inline_image(&self, asset: &AssetRef, probe: &MediaProbe) -> Option<InlineImage> {
        if !self.has_model() || asset.media_kind != MediaKind::Image || !probe.is_image() {
            return None;
        }
        let bytes = asset.media.as_deref()?;
        let mime = probe.mime_type.as_deref()?;
        Some(InlineImage::encode(bytes, mime))
    }
}

async fn evaluate_criterion(
    runner: &CascadeRunner<'_>,
    input: &EvaluationInput<'_>,
    criterion: Criterion,
) -> CascadeOutcome {
    let plan = evaluator_for(criterion).plan(input);
    runner.run(criterion, &plan).await
}

/// Builder for ScoringOrchestrator.
pub struct ScoringOrchestratorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    config: RuntimeConfig,
}

impl ScoringOrchestratorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            provider: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Set the LLM provider.
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the orchestrator. Fails only on invalid configuration.
    pub fn build(self) -> Result<ScoringOrchestrator, RuntimeError> {
        self.config.validate()?;
        Ok(ScoringOrchestrator::new(self.provider, self.config))
    }
}

impl Default for ScoringOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
