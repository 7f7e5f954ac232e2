//! Risk Engine Implementation

use crate::{heuristic, round4};
use category_encoder::FieldKind;
use chrono::{Datelike, Utc};
use model_store::{LogisticModel, ModelError, ResolverState};
use serde::{Deserialize, Serialize};
use site_record::{AttributeRecord, RecordError};
use tracing::{debug, warn};

/// Keys a risk request must carry
pub const RISK_REQUIRED_FIELDS: [&str; 6] = [
    "latitude",
    "longitude",
    "landslide_trigger",
    "landslide_size",
    "admin_division_name",
    "annual_rainfall_mm",
];

/// Discrete risk level derived from the high-risk probability.
///
/// Boundaries are strict greater-than: exactly 0.7 is MEDIUM and exactly
/// 0.3 is LOW. Downstream consumers rely on these thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Classify a probability
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.7 {
            RiskLevel::High
        } else if probability > 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        }
    }
}

/// Which path produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringMethod {
    /// Resolved statistical model
    Trained,
    /// Closed-form heuristic
    Heuristic,
}

/// Coarse confidence attached to a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
}

/// Weighted per-factor contributions, for explainability
#[derive(Debug, Clone, Serialize)]
pub struct RiskBreakdown {
    pub rainfall: f64,
    pub trigger: f64,
    pub size: f64,
    pub geographic: f64,
    pub topographic: f64,
}

/// Output of one risk scoring call
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    /// Probability mass on the high-risk class, rounded to 4 decimals
    pub high_risk_probability: f64,
    /// Derived discrete level
    pub risk_level: RiskLevel,
    /// Path that produced the score
    pub method: ScoringMethod,
    /// Coarse confidence
    pub confidence: Confidence,
    /// Factor contributions; present on the heuristic path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<RiskBreakdown>,
}

/// Score the rockfall high-risk probability for one request.
///
/// Missing required fields are the only caller-visible failure. Any error
/// on the trained path degrades to the heuristic for this request.
pub fn score_risk(
    state: &ResolverState,
    record: &AttributeRecord,
) -> Result<RiskAssessment, RecordError> {
    record.require(&RISK_REQUIRED_FIELDS)?;

    let latitude = record.number("latitude")?;
    let longitude = record.number("longitude")?;
    let rainfall_mm = record.number("annual_rainfall_mm")?;
    let trigger = record.text_or("landslide_trigger", "");
    let size = record.text_or("landslide_size", "");
    let division = record.text_or("admin_division_name", "");

    if let Some(classifier) = &state.risk_classifier {
        match trained_assessment(
            state, classifier, latitude, longitude, rainfall_mm, &trigger, &size, &division,
        ) {
            Ok(assessment) => return Ok(assessment),
            Err(e) => {
                warn!(error = %e, "trained risk inference failed, degrading to heuristic");
            }
        }
    } else {
        debug!(tier = state.risk_tier.as_str(), "no classifier resolved, using heuristic");
    }

    Ok(heuristic::assess(
        latitude, longitude, rainfall_mm, &trigger, &size, &division,
    ))
}

/// Bounds keeping a reported trained-path probability away from the exact
/// endpoints even when the sigmoid saturates in f64
const TRAINED_PROBABILITY_RANGE: (f64, f64) = (0.0001, 0.9999);

#[allow(clippy::too_many_arguments)]
fn trained_assessment(
    state: &ResolverState,
    classifier: &LogisticModel,
    latitude: f64,
    longitude: f64,
    rainfall_mm: f64,
    trigger: &str,
    size: &str,
    division: &str,
) -> Result<RiskAssessment, ModelError> {
    let mut features = vec![
        latitude,
        longitude,
        f64::from(state.encode_category(FieldKind::Trigger, trigger)),
        f64::from(state.encode_category(FieldKind::Size, size)),
        f64::from(state.encode_category(FieldKind::Division, division)),
        rainfall_mm,
    ];

    // Newer vendor models take a 10-wide vector with temporal features;
    // detected from the model's declared arity, not a flag.
    if classifier.input_arity() >= 10 {
        let now = Utc::now();
        features.push(f64::from(now.year()));
        features.push(f64::from(now.month()));
        features.push(f64::from(now.day()));
        features.push(f64::from(now.weekday().num_days_from_monday()));
    }

    let probability = classifier
        .predict_proba(&features)?
        .clamp(TRAINED_PROBABILITY_RANGE.0, TRAINED_PROBABILITY_RANGE.1);

    Ok(RiskAssessment {
        high_risk_probability: round4(probability),
        risk_level: RiskLevel::from_probability(probability),
        method: ScoringMethod::Trained,
        confidence: Confidence::High,
        breakdown: None,
    })
}
