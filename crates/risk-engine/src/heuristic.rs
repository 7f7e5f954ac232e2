//! Weighted Heuristic Risk Scoring
//!
//! Deterministic closed-form scoring used when no classifier is resolved or
//! when trained inference fails mid-request. Five bounded sub-scores are
//! combined with fixed weights, enriched with a smooth topographic term,
//! perturbed by a location-seeded offset, and clamped away from 0 and 1.

use crate::engine::{Confidence, RiskAssessment, RiskBreakdown, RiskLevel, ScoringMethod};
use crate::{round3, round4};
use category_encoder::stable_hash;

const WEIGHT_RAINFALL: f64 = 0.35;
const WEIGHT_TRIGGER: f64 = 0.30;
const WEIGHT_SIZE: f64 = 0.25;
const WEIGHT_GEOGRAPHIC: f64 = 0.10;
const WEIGHT_TOPOGRAPHIC: f64 = 0.10;

/// Administrative divisions with historically high rockfall incidence
const HIGH_INCIDENCE_DIVISIONS: [&str; 3] = ["jharkhand", "chhattisgarh", "odisha"];

/// Rainfall sub-score in `[0.1, 0.9]` with nonlinear emphasis on extremes
pub fn rainfall_risk(rainfall_mm: f64) -> f64 {
    let normalized = (rainfall_mm / 2500.0).clamp(0.0, 1.0);
    0.1 + normalized.powf(1.2) * 0.8
}

/// Trigger sub-score from the fixed lookup table
pub fn trigger_risk(trigger: &str) -> f64 {
    match trigger.to_lowercase().as_str() {
        "earthquake" => 0.8,
        "mining" => 0.7,
        "rainfall" => 0.6,
        "human activity" => 0.5,
        "construction" => 0.4,
        "natural erosion" => 0.3,
        _ => 0.5,
    }
}

/// Size sub-score from the fixed lookup table
pub fn size_risk(size: &str) -> f64 {
    match size.to_lowercase().as_str() {
        "very large" => 0.9,
        "large" => 0.7,
        "medium" => 0.4,
        "small" => 0.2,
        _ => 0.5,
    }
}

/// Geographic sub-score: elevated for high-incidence divisions
pub fn geographic_risk(division: &str) -> f64 {
    let division_lower = division.to_lowercase();
    if HIGH_INCIDENCE_DIVISIONS.contains(&division_lower.as_str()) {
        0.7
    } else {
        0.4
    }
}

/// Smooth, bounded topographic proxy varying deterministically with location
pub fn topographic_risk(latitude: f64, longitude: f64) -> f64 {
    let terrain = ((latitude * 0.1).sin() * (longitude * 0.1).cos()).abs();
    (0.3 + terrain * 0.4).clamp(0.2, 0.8)
}

/// Deterministic location-seeded perturbation in `[-0.1, 0.1)`.
///
/// Identical coordinates always yield the identical offset.
pub fn location_perturbation(latitude: f64, longitude: f64) -> f64 {
    let hashed = stable_hash(&format!("{latitude:.4}:{longitude:.4}"));
    ((hashed % 1000) as f64 / 1000.0 - 0.5) * 0.2
}

/// Full heuristic assessment for one request
pub(crate) fn assess(
    latitude: f64,
    longitude: f64,
    rainfall_mm: f64,
    trigger: &str,
    size: &str,
    division: &str,
) -> RiskAssessment {
    let rainfall = rainfall_risk(rainfall_mm);
    let trigger_score = trigger_risk(trigger);
    let size_score = size_risk(size);
    let geographic = geographic_risk(division);
    let topographic = topographic_risk(latitude, longitude);

    let combined = rainfall * WEIGHT_RAINFALL
        + trigger_score * WEIGHT_TRIGGER
        + size_score * WEIGHT_SIZE
        + geographic * WEIGHT_GEOGRAPHIC;

    // Blend the topographic enrichment in, renormalizing the weight sum
    let blended =
        (combined + topographic * WEIGHT_TOPOGRAPHIC) / (1.0 + WEIGHT_TOPOGRAPHIC);

    let probability =
        (blended + location_perturbation(latitude, longitude)).clamp(0.02, 0.98);

    RiskAssessment {
        high_risk_probability: round4(probability),
        risk_level: RiskLevel::from_probability(probability),
        method: ScoringMethod::Heuristic,
        confidence: Confidence::Medium,
        breakdown: Some(RiskBreakdown {
            rainfall: round3(rainfall * WEIGHT_RAINFALL),
            trigger: round3(trigger_score * WEIGHT_TRIGGER),
            size: round3(size_score * WEIGHT_SIZE),
            geographic: round3(geographic * WEIGHT_GEOGRAPHIC),
            topographic: round3(topographic * WEIGHT_TOPOGRAPHIC),
        }),
    }
}
