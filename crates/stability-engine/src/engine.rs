//! Stability Engine Implementation

use category_encoder::FieldKind;
use model_store::{LinearModel, ModelError, ResolverState};
use risk_engine::{Confidence, RiskLevel, ScoringMethod};
use serde::{Deserialize, Serialize};
use site_record::{AttributeRecord, RecordError};
use tracing::{debug, warn};

/// Keys a stability request must carry
pub const STABILITY_REQUIRED_FIELDS: [&str; 4] =
    ["unit_weight", "cohesion", "friction_angle", "slope_angle"];

/// Defaults substituted for the optional parameters
const DEFAULT_SLOPE_HEIGHT: f64 = 10.0;
const DEFAULT_PORE_PRESSURE_RATIO: f64 = 0.0;
const DEFAULT_REINFORCEMENT: &str = "None";

/// Engineering clamp range for a reported factor of safety
const FACTOR_RANGE: (f64, f64) = (0.3, 8.0);

/// Stable value substituted when a trigonometric term degenerates
const DEGENERATE_TERM: f64 = 10.0;

/// Discrete stability status derived from the factor of safety.
///
/// Boundaries are strict greater-than: exactly 1.5 is MARGINALLY_STABLE and
/// exactly 1.0 is UNSTABLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StabilityStatus {
    Stable,
    MarginallyStable,
    Unstable,
}

impl StabilityStatus {
    /// Classify a factor of safety
    pub fn from_factor(factor: f64) -> Self {
        if factor > 1.5 {
            StabilityStatus::Stable
        } else if factor > 1.0 {
            StabilityStatus::MarginallyStable
        } else {
            StabilityStatus::Unstable
        }
    }

    /// Mirrored risk level: stable slopes are low risk
    pub fn risk_level(&self) -> RiskLevel {
        match self {
            StabilityStatus::Stable => RiskLevel::Low,
            StabilityStatus::MarginallyStable => RiskLevel::Medium,
            StabilityStatus::Unstable => RiskLevel::High,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityStatus::Stable => "STABLE",
            StabilityStatus::MarginallyStable => "MARGINALLY_STABLE",
            StabilityStatus::Unstable => "UNSTABLE",
        }
    }
}

/// Effective input parameters, echoed back for traceability
#[derive(Debug, Clone, Serialize)]
pub struct StabilityParameters {
    pub unit_weight: f64,
    pub cohesion: f64,
    pub friction_angle: f64,
    pub slope_angle: f64,
    pub slope_height: f64,
    pub pore_pressure_ratio: f64,
    pub reinforcement: String,
}

/// Output of one stability scoring call
#[derive(Debug, Clone, Serialize)]
pub struct StabilityAssessment {
    /// Factor of safety, rounded to 3 decimals, clamped to `[0.3, 8.0]`
    pub factor_of_safety: f64,
    /// Derived discrete status
    pub stability_status: StabilityStatus,
    /// Risk-level mirror of the status
    pub risk_level: RiskLevel,
    /// Path that produced the score
    pub method: ScoringMethod,
    /// Coarse confidence
    pub confidence: Confidence,
    /// Inputs after defaulting
    pub parameters: StabilityParameters,
}

/// Score the slope factor of safety for one request.
///
/// The four geotechnical fields are required; slope height, pore pressure
/// ratio and reinforcement default when absent. Trained-path errors degrade
/// to the infinite-slope heuristic for this request.
pub fn score_stability(
    state: &ResolverState,
    record: &AttributeRecord,
) -> Result<StabilityAssessment, RecordError> {
    record.require(&STABILITY_REQUIRED_FIELDS)?;

    let parameters = StabilityParameters {
        unit_weight: record.number("unit_weight")?,
        cohesion: record.number("cohesion")?,
        friction_angle: record.number("friction_angle")?,
        slope_angle: record.number("slope_angle")?,
        slope_height: record.number_or("slope_height", DEFAULT_SLOPE_HEIGHT)?,
        pore_pressure_ratio: record
            .number_or("pore_pressure_ratio", DEFAULT_PORE_PRESSURE_RATIO)?,
        reinforcement: record.text_or("reinforcement", DEFAULT_REINFORCEMENT),
    };

    if let Some(regressor) = &state.stability_regressor {
        match trained_factor(state, regressor, &parameters) {
            Ok(factor) => return Ok(assessment(factor, ScoringMethod::Trained, parameters)),
            Err(e) => {
                warn!(error = %e, "trained stability inference failed, degrading to heuristic");
            }
        }
    } else {
        debug!(
            tier = state.stability_tier.as_str(),
            "no regressor resolved, using infinite-slope approximation"
        );
    }

    let factor = heuristic_factor(&parameters);
    Ok(assessment(factor, ScoringMethod::Heuristic, parameters))
}

fn assessment(
    factor: f64,
    method: ScoringMethod,
    parameters: StabilityParameters,
) -> StabilityAssessment {
    let clamped = factor.clamp(FACTOR_RANGE.0, FACTOR_RANGE.1);
    let status = StabilityStatus::from_factor(clamped);
    StabilityAssessment {
        factor_of_safety: round3(clamped),
        stability_status: status,
        risk_level: status.risk_level(),
        method,
        confidence: match method {
            ScoringMethod::Trained => Confidence::High,
            ScoringMethod::Heuristic => Confidence::Medium,
        },
        parameters,
    }
}

fn trained_factor(
    state: &ResolverState,
    regressor: &LinearModel,
    parameters: &StabilityParameters,
) -> Result<f64, ModelError> {
    let reinforcement_code = f64::from(
        state.encode_category(FieldKind::Reinforcement, &parameters.reinforcement),
    );

    regressor.predict(&[
        parameters.unit_weight,
        parameters.cohesion,
        parameters.friction_angle,
        parameters.slope_angle,
        parameters.slope_height,
        parameters.pore_pressure_ratio,
        reinforcement_code,
    ])
}

/// Infinite-slope approximation: a cohesion-driven term plus a
/// friction-driven term, times a reinforcement multiplier.
fn heuristic_factor(parameters: &StabilityParameters) -> f64 {
    let slope_angle = parameters.slope_angle;

    let base = if slope_angle <= 0.0 || slope_angle >= 90.0 {
        // Degenerate geometry: flat or overhanging input
        DEGENERATE_TERM + DEGENERATE_TERM
    } else {
        let slope_rad = slope_angle.to_radians();
        let friction_rad = parameters.friction_angle.to_radians();

        let driving = parameters.unit_weight * slope_rad.sin() * slope_rad.cos();
        let fs_cohesion = if driving > 0.0 {
            parameters.cohesion / driving
        } else {
            DEGENERATE_TERM
        };
        let fs_friction = if slope_rad.tan() > 0.0 {
            friction_rad.tan() / slope_rad.tan()
        } else {
            DEGENERATE_TERM
        };
        fs_cohesion + fs_friction
    };

    base * reinforcement_multiplier(&parameters.reinforcement)
}

fn reinforcement_multiplier(reinforcement: &str) -> f64 {
    match reinforcement.to_lowercase().as_str() {
        "anchor" => 1.6,
        "mesh" => 1.3,
        "retaining wall" => 2.2,
        _ => 1.0,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1_000.0).round() / 1_000.0
}
