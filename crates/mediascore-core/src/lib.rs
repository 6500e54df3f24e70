//! # mediascore-core
//!
//! Deterministic scoring primitives for generated media.
//!
//! This crate holds everything about an evaluation that does not need a
//! model call:
//! - The data model (`AssetRef`, `CriterionScore`, `EvaluationResult`)
//! - Media probing (pixel dimensions, MIME type)
//! - The four heuristic scorers, used as the last-resort strategy
//! - The Synthesizer that computes the weighted composite
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No I/O**: Heuristics and synthesis never touch the network or disk
//! 3. **Total**: Every heuristic returns a value in `[0, 100]` for any input
//!
//! Model-assisted evaluation lives in `mediascore-runtime`.
//!
//! ## Example
//!
//! ```rust
//! use mediascore_core::heuristics::{size_heuristic, subject_heuristic};
//!
//! assert_eq!(size_heuristic(1024, 1024), 100.0);
//! assert!(subject_heuristic("a beautiful red shoe design", "Shoe") > 0.0);
//! ```

pub mod descriptor;
pub mod heuristics;
pub mod media;
pub mod synthesizer;
pub mod types;

// Re-export main types at crate root
pub use descriptor::{AssetDescriptor, DescriptorError};
pub use heuristics::{HeuristicContext, SizeTarget};
pub use media::MediaProbe;
pub use synthesizer::Synthesizer;
pub use types::{
    clamp_score, AssetRef, BrandProfile, Criterion, CriterionScore, CriterionScores,
    EvaluationResult, MediaKind, ScoreSource,
};
