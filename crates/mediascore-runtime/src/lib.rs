//! # mediascore-runtime
//!
//! Model-assisted scoring for generated media.
//!
//! Each asset is scored on four criteria concurrently. Every criterion runs
//! a fallback cascade (vision model, then text model, then the
//! deterministic heuristic from `mediascore-core`), each model step under
//! its own deadline. Model unavailability degrades quality, never
//! availability: an evaluation always returns a complete result.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mediascore_core::AssetRef;
//! use mediascore_runtime::{RuntimeConfig, ScoringOrchestrator};
//!
//! let mut config = RuntimeConfig::from_file("mediascore.yaml")?;
//! config.apply_env_overrides();
//! let orchestrator = ScoringOrchestrator::from_config(config)?;
//!
//! let asset = AssetRef::image("shoe.png", "a dramatic red shoe").with_media(bytes);
//! let result = orchestrator.evaluate(&asset).await;
//! println!("end score: {}", result.end_score);
//! ```
//!
//! ## Features
//!
//! - `openai`: OpenAI-compatible chat-completions provider (reqwest)

pub mod config;
pub mod evaluators;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod resilience;
pub mod scoring;

pub use config::{ConfigError, ProviderSettings, RuntimeConfig, StepConfig};
pub use evaluators::{CriterionEvaluator, EvaluationInput};
pub use orchestrator::{RuntimeError, RuntimeResult, ScoringOrchestrator, ScoringOrchestratorBuilder};
pub use providers::{LlmProvider, ProviderError, ProviderRegistry};
pub use resilience::{Attempt, AttemptOutcome, CascadePlan, CascadeRunner, Strategy, StrategyKind};
pub use scoring::{
    CallOptions, ModelScoringClient, ScoreReply, ScoringError, ScoringErrorKind, ScoringRequest,
};
