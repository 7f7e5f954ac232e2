//! Rockfall Risk Scoring Engine
//!
//! Computes the high-risk probability for a site either via the resolved
//! classifier or via a deterministic weighted heuristic, and classifies the
//! result into a risk level. Structurally valid requests always get a
//! usable score; trained-path failures degrade to the heuristic.

mod engine;
mod heuristic;

pub use engine::{
    score_risk, Confidence, RiskAssessment, RiskBreakdown, RiskLevel, ScoringMethod,
    RISK_REQUIRED_FIELDS,
};
pub use heuristic::{
    geographic_risk, location_perturbation, rainfall_risk, size_risk, topographic_risk,
    trigger_risk,
};

/// Round to 4 decimal places (reported probabilities)
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Round to 3 decimal places (factor breakdowns)
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1_000.0).round() / 1_000.0
}
