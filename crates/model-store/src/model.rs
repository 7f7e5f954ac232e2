//! Predictive Model Variants
//!
//! Two model shapes cover everything the engines need: a probabilistic
//! classifier for high-risk probability and a point regressor for factor of
//! safety. Both are plain coefficient vectors, whether loaded from an
//! artifact or fitted in-process.

use crate::ModelError;
use serde::{Deserialize, Serialize};

/// Which fallback strategy produced the active models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelTier {
    /// Loaded from persisted artifacts
    Trained,
    /// Fitted in-process on seeded synthetic data
    Synthesized,
    /// No statistical model; heuristics only
    None,
}

impl ModelTier {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Trained => "TRAINED",
            ModelTier::Synthesized => "SYNTHESIZED",
            ModelTier::None => "NONE",
        }
    }
}

/// Binary logistic-regression classifier.
///
/// `predict_proba` returns the probability mass on the positive ("high
/// risk") class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Per-feature coefficients; length declares the input arity
    pub weights: Vec<f64>,
    /// Bias term
    pub intercept: f64,
}

impl LogisticModel {
    /// Number of input features the model expects
    pub fn input_arity(&self) -> usize {
        self.weights.len()
    }

    /// Probability of the positive class for one feature vector
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.weights.len() {
            return Err(ModelError::InvalidInputShape {
                expected: self.weights.len(),
                actual: features.len(),
            });
        }

        let z: f64 = self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>();
        let p = 1.0 / (1.0 + (-z).exp());

        if p.is_finite() {
            Ok(p)
        } else {
            Err(ModelError::InferenceFailed(format!(
                "non-finite probability from logit {z}"
            )))
        }
    }
}

/// Linear point regressor for factor-of-safety prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Per-feature coefficients; length declares the input arity
    pub weights: Vec<f64>,
    /// Bias term
    pub intercept: f64,
}

impl LinearModel {
    /// Number of input features the model expects
    pub fn input_arity(&self) -> usize {
        self.weights.len()
    }

    /// Scalar prediction for one feature vector
    pub fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.weights.len() {
            return Err(ModelError::InvalidInputShape {
                expected: self.weights.len(),
                actual: features.len(),
            });
        }

        let y: f64 = self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>();

        if y.is_finite() {
            Ok(y)
        } else {
            Err(ModelError::InferenceFailed(
                "non-finite regression output".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logistic_probability_bounds() {
        let model = LogisticModel {
            weights: vec![2.0, -1.0],
            intercept: 0.5,
        };
        let p = model.predict_proba(&[1.0, 3.0]).unwrap();
        assert!(p > 0.0 && p < 1.0);
    }

    #[test]
    fn test_logistic_monotone_in_positive_weight() {
        let model = LogisticModel {
            weights: vec![1.5],
            intercept: 0.0,
        };
        let low = model.predict_proba(&[0.1]).unwrap();
        let high = model.predict_proba(&[0.9]).unwrap();
        assert!(high > low);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let model = LogisticModel {
            weights: vec![1.0; 6],
            intercept: 0.0,
        };
        assert!(matches!(
            model.predict_proba(&[1.0; 10]),
            Err(ModelError::InvalidInputShape {
                expected: 6,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_linear_prediction() {
        let model = LinearModel {
            weights: vec![0.5, 0.25],
            intercept: 1.0,
        };
        let y = model.predict(&[2.0, 4.0]).unwrap();
        assert!((y - 3.0).abs() < 1e-12);
    }
}
