//! In-Process Model Synthesis
//!
//! When no persisted artifacts are found, the resolver fits a classifier and
//! a regressor on procedurally generated training data with hand-chosen
//! feature correlations: rainfall, trigger and size dominate risk, and a
//! Mohr-Coulomb-style combination dominates stability. A fixed seed keeps
//! repeated synthesis reproducible.

use crate::model::{LinearModel, LogisticModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::info;

/// Fixed seed for synthetic training data
pub const SYNTH_SEED: u64 = 42;

const SAMPLES: usize = 1000;

/// Sub-score tables indexed by canonical category code, mirroring the
/// heuristic domain priors the synthetic labels are drawn from
const TRIGGER_RISK_BY_CODE: [f64; 6] = [0.4, 0.8, 0.5, 0.7, 0.6, 0.3];
const SIZE_RISK_BY_CODE: [f64; 4] = [0.9, 0.7, 0.4, 0.2];
const DIVISION_RISK_BY_CODE: [f64; 6] = [0.7, 0.7, 0.7, 0.4, 0.4, 0.4];

/// Fit a risk classifier on synthetic data.
///
/// Features are generated in raw inference units so the fitted coefficients
/// apply directly to the vector the engine assembles: `[latitude,
/// longitude, trigger_code, size_code, division_code, rainfall_mm]`. Labels
/// are dominated by rainfall, trigger and size with additive Gaussian noise.
pub fn synthesize_risk_classifier(rng: &mut StdRng) -> LogisticModel {
    let noise = Normal::new(0.0, 0.1).expect("valid normal parameters");

    let mut features = Vec::with_capacity(SAMPLES);
    let mut labels = Vec::with_capacity(SAMPLES);
    for _ in 0..SAMPLES {
        let latitude = rng.gen_range(8.0..36.0);
        let longitude = rng.gen_range(68.0..98.0);
        let trigger = rng.gen_range(0..TRIGGER_RISK_BY_CODE.len());
        let size = rng.gen_range(0..SIZE_RISK_BY_CODE.len());
        let division = rng.gen_range(0..DIVISION_RISK_BY_CODE.len());
        let rainfall_mm: f64 = rng.gen_range(0.0..5000.0);

        let score = 0.35 * (rainfall_mm / 2500.0).clamp(0.0, 1.0)
            + 0.30 * TRIGGER_RISK_BY_CODE[trigger]
            + 0.25 * SIZE_RISK_BY_CODE[size]
            + 0.10 * DIVISION_RISK_BY_CODE[division]
            + noise.sample(rng);
        labels.push(if score > 0.6 { 1.0 } else { 0.0 });
        features.push(vec![
            latitude,
            longitude,
            trigger as f64,
            size as f64,
            division as f64,
            rainfall_mm,
        ]);
    }

    let model = fit_logistic(&features, &labels, 0.5, 300);
    info!(samples = SAMPLES, "synthesized risk classifier");
    model
}

/// Fit a stability regressor on synthetic data.
///
/// Features follow the stability vector layout `[unit_weight, cohesion,
/// friction_angle, slope_angle, slope_height, pore_pressure_ratio,
/// reinforcement_code]`; targets come from the infinite-slope factor of
/// safety with reinforcement multipliers and Gaussian noise.
pub fn synthesize_stability_regressor(rng: &mut StdRng) -> LinearModel {
    let noise = Normal::new(0.0, 0.2).expect("valid normal parameters");
    let reinforcement_factors = [1.0, 1.6, 1.3, 2.2];

    let mut features = Vec::with_capacity(SAMPLES);
    let mut targets = Vec::with_capacity(SAMPLES);
    for _ in 0..SAMPLES {
        let unit_weight = rng.gen_range(14.0..26.0);
        let cohesion = rng.gen_range(0.0..60.0);
        let friction_angle: f64 = rng.gen_range(15.0..45.0);
        let slope_angle: f64 = rng.gen_range(10.0..80.0);
        let slope_height = rng.gen_range(2.0..50.0);
        let pore_ratio = rng.gen_range(0.0..0.6);
        let reinforcement = rng.gen_range(0..4usize);

        let slope_rad = slope_angle.to_radians();
        let fs_cohesion = cohesion / (unit_weight * slope_rad.sin() * slope_rad.cos());
        let fs_friction = friction_angle.to_radians().tan() / slope_rad.tan();
        let base = (fs_cohesion + fs_friction) * (1.0 - 0.5 * pore_ratio);
        let fs = (base * reinforcement_factors[reinforcement] + noise.sample(rng))
            .clamp(0.3, 8.0);

        features.push(vec![
            unit_weight,
            cohesion,
            friction_angle,
            slope_angle,
            slope_height,
            pore_ratio,
            reinforcement as f64,
        ]);
        targets.push(fs);
    }

    let model = fit_linear(&features, &targets, 0.05, 500);
    info!(samples = SAMPLES, "synthesized stability regressor");
    model
}

/// Synthesize both models from the fixed seed
pub fn synthesize_models() -> (LogisticModel, LinearModel) {
    let mut rng = StdRng::seed_from_u64(SYNTH_SEED);
    let classifier = synthesize_risk_classifier(&mut rng);
    let regressor = synthesize_stability_regressor(&mut rng);
    (classifier, regressor)
}

/// Per-column standardization so one learning rate works across the very
/// different raw feature scales
fn standardize(x: &[Vec<f64>]) -> (Vec<Vec<f64>>, Vec<f64>, Vec<f64>) {
    let n = x.len() as f64;
    let dims = x[0].len();

    let mut means = vec![0.0; dims];
    for xi in x {
        for (m, v) in means.iter_mut().zip(xi) {
            *m += v;
        }
    }
    for m in &mut means {
        *m /= n;
    }

    let mut stds = vec![0.0; dims];
    for xi in x {
        for ((s, m), v) in stds.iter_mut().zip(&means).zip(xi) {
            *s += (v - m) * (v - m);
        }
    }
    for s in &mut stds {
        *s = (*s / n).sqrt().max(1e-9);
    }

    let standardized = x
        .iter()
        .map(|xi| {
            xi.iter()
                .zip(&means)
                .zip(&stds)
                .map(|((v, m), s)| (v - m) / s)
                .collect()
        })
        .collect();

    (standardized, means, stds)
}

/// Map standardized-space coefficients back to raw feature space
fn unfold(weights: &[f64], intercept: f64, means: &[f64], stds: &[f64]) -> (Vec<f64>, f64) {
    let raw_weights: Vec<f64> = weights.iter().zip(stds).map(|(w, s)| w / s).collect();
    let raw_intercept = intercept
        - raw_weights
            .iter()
            .zip(means)
            .map(|(w, m)| w * m)
            .sum::<f64>();
    (raw_weights, raw_intercept)
}

fn fit_logistic(x: &[Vec<f64>], y: &[f64], learning_rate: f64, epochs: usize) -> LogisticModel {
    let n = x.len() as f64;
    let dims = x[0].len();
    let (standardized, means, stds) = standardize(x);

    let mut weights = vec![0.0; dims];
    let mut intercept = 0.0;
    for _ in 0..epochs {
        let mut grad_w = vec![0.0; dims];
        let mut grad_b = 0.0;
        for (xi, yi) in standardized.iter().zip(y) {
            let z: f64 = intercept + weights.iter().zip(xi).map(|(w, v)| w * v).sum::<f64>();
            let p = 1.0 / (1.0 + (-z).exp());
            let residual = p - yi;
            for (g, v) in grad_w.iter_mut().zip(xi) {
                *g += residual * v;
            }
            grad_b += residual;
        }
        for (w, g) in weights.iter_mut().zip(&grad_w) {
            *w -= learning_rate * g / n;
        }
        intercept -= learning_rate * grad_b / n;
    }

    let (weights, intercept) = unfold(&weights, intercept, &means, &stds);
    LogisticModel { weights, intercept }
}

fn fit_linear(x: &[Vec<f64>], y: &[f64], learning_rate: f64, epochs: usize) -> LinearModel {
    let n = x.len() as f64;
    let dims = x[0].len();
    let (standardized, means, stds) = standardize(x);

    let mut weights = vec![0.0; dims];
    let mut intercept = 0.0;
    for _ in 0..epochs {
        let mut grad_w = vec![0.0; dims];
        let mut grad_b = 0.0;
        for (xi, yi) in standardized.iter().zip(y) {
            let pred: f64 =
                intercept + weights.iter().zip(xi).map(|(w, v)| w * v).sum::<f64>();
            let residual = pred - yi;
            for (g, v) in grad_w.iter_mut().zip(xi) {
                *g += residual * v;
            }
            grad_b += residual;
        }
        for (w, g) in weights.iter_mut().zip(&grad_w) {
            *w -= learning_rate * g / n;
        }
        intercept -= learning_rate * grad_b / n;
    }

    let (weights, intercept) = unfold(&weights, intercept, &means, &stds);
    LinearModel { weights, intercept }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesis_is_reproducible() {
        let (c1, r1) = synthesize_models();
        let (c2, r2) = synthesize_models();
        assert_eq!(c1, c2);
        assert_eq!(r1, r2);
    }

    #[test]
    fn test_classifier_calibrated_on_raw_inference_units() {
        let (classifier, _) = synthesize_models();
        assert_eq!(classifier.input_arity(), 6);
        // Canonical scenario vectors in the engine's raw units must not
        // saturate the sigmoid
        for features in [
            [23.5, 85.5, 1.0, 0.0, 1.0, 2500.0],
            [25.0, 78.0, 0.0, 3.0, 3.0, 600.0],
        ] {
            let p = classifier.predict_proba(&features).unwrap();
            assert!(p > 0.0 && p < 1.0, "saturated probability {p}");
        }
    }

    #[test]
    fn test_classifier_learned_severity_dominance() {
        let (classifier, _) = synthesize_models();
        let quiet = classifier
            .predict_proba(&[25.0, 78.0, 0.0, 3.0, 3.0, 300.0])
            .unwrap();
        let severe = classifier
            .predict_proba(&[23.5, 85.5, 1.0, 0.0, 1.0, 4000.0])
            .unwrap();
        assert!(severe > quiet);
    }

    #[test]
    fn test_regressor_prefers_gentle_cohesive_slopes() {
        let (_, regressor) = synthesize_models();
        assert_eq!(regressor.input_arity(), 7);
        let gentle = regressor
            .predict(&[18.0, 40.0, 35.0, 20.0, 10.0, 0.1, 0.0])
            .unwrap();
        let steep = regressor
            .predict(&[22.0, 5.0, 18.0, 70.0, 30.0, 0.5, 0.0])
            .unwrap();
        assert!(gentle > steep);
    }
}
