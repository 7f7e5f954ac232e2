//! Tiered Model Store
//!
//! Resolves the predictive models and category encoders the scoring engines
//! run on. Initialization tries, in order: previously persisted artifacts
//! (trained tier), seeded in-process synthesis (synthesized tier), and the
//! hand-authored heuristic tables. It always terminates in one of the three
//! tiers and records which one for health reporting.

mod artifact;
mod model;
mod resolver;
mod synth;

pub use artifact::{candidate_directories, scan_directories, TrainedArtifacts};
pub use model::{LinearModel, LogisticModel, ModelTier};
pub use resolver::{
    CategoryOptions, EncoderSet, HealthSnapshot, ResolverConfig, ResolverState,
};
pub use synth::{
    synthesize_models, synthesize_risk_classifier, synthesize_stability_regressor, SYNTH_SEED,
};

use thiserror::Error;

/// Errors during model loading or inference
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model load failed: {0}")]
    LoadFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}
