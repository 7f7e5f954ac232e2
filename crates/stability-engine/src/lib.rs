//! Slope Stability Scoring Engine
//!
//! Computes a factor of safety either via the resolved regressor or via an
//! infinite-slope closed-form approximation, and classifies the result into
//! a stability status with a mirrored risk level.

mod engine;

pub use engine::{
    score_stability, StabilityAssessment, StabilityParameters, StabilityStatus,
    STABILITY_REQUIRED_FIELDS,
};
