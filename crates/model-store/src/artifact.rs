//! Model Artifact Discovery and Loading
//!
//! Scans a prioritized list of candidate directories for persisted model
//! and encoder artifacts. Each artifact is tried under several filename
//! aliases: the newer vendor naming convention first, then the legacy one.
//! Partial load failures are logged and skipped, never fatal.

use crate::model::{LinearModel, LogisticModel};
use crate::ModelError;
use category_encoder::{CategoryEncoder, FieldKind};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Filename aliases for the risk classifier, vendor convention first
const RISK_MODEL_ALIASES: [&str; 2] =
    ["rockfall_risk_model_india_tuned.json", "rockfall_risk_model.json"];

/// Filename aliases for the stability regressor
const STABILITY_MODEL_ALIASES: [&str; 2] =
    ["slope_stability_model_tuned.json", "slope_stability_model.json"];

fn encoder_aliases(field: FieldKind) -> [&'static str; 2] {
    match field {
        FieldKind::Trigger => ["le_trigger_india.json", "risk_trigger_encoder.json"],
        FieldKind::Size => ["le_size_india.json", "risk_size_encoder.json"],
        FieldKind::Division => ["le_division_india.json", "risk_division_encoder.json"],
        FieldKind::Reinforcement => ["le_reinforcement.json", "slope_reinforcement_encoder.json"],
    }
}

/// On-disk form of a fitted encoder: the label list in code order
#[derive(Debug, Deserialize)]
struct EncoderArtifact {
    classes: Vec<String>,
}

/// Everything the trained tier managed to load
#[derive(Debug, Default)]
pub struct TrainedArtifacts {
    /// Risk classifier (required for the tier to count as loaded)
    pub classifier: Option<LogisticModel>,
    /// Stability regressor (optional)
    pub regressor: Option<LinearModel>,
    /// Fitted encoders by field
    pub encoders: Vec<(FieldKind, CategoryEncoder)>,
}

impl TrainedArtifacts {
    /// Trained tier succeeds with the risk classifier plus at least three
    /// of the four encoders
    pub fn is_sufficient(&self) -> bool {
        self.classifier.is_some() && self.encoders.len() >= 3
    }

    fn has_encoder(&self, field: FieldKind) -> bool {
        self.encoders.iter().any(|(f, _)| *f == field)
    }
}

/// Candidate model directories in order of preference, filtered to those
/// that exist. The filtered list is what health reporting exposes as the
/// probed directories.
pub fn candidate_directories(base: &Path) -> Vec<PathBuf> {
    let mut potential = vec![base.join("models")];
    if let Some(parent) = base.parent() {
        potential.push(parent.join("models").join("terranox"));
    }
    potential.push(PathBuf::from("models").join("terranox"));
    if Path::new("/app").exists() {
        potential.push(PathBuf::from("/app/models"));
    }
    potential.push(std::env::temp_dir().join("models"));

    potential.into_iter().filter(|p| p.is_dir()).collect()
}

fn load_json<T: DeserializeOwned>(dir: &Path, aliases: &[&str], what: &str) -> Option<T> {
    for alias in aliases {
        let path = dir.join(alias);
        if !path.is_file() {
            continue;
        }
        match fs::read_to_string(&path)
            .map_err(|e| ModelError::LoadFailed(e.to_string()))
            .and_then(|text| {
                serde_json::from_str::<T>(&text).map_err(|e| ModelError::LoadFailed(e.to_string()))
            }) {
            Ok(value) => {
                info!(path = %path.display(), "loaded {what}");
                return Some(value);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load {what}, skipping");
            }
        }
    }
    None
}

/// Scan the candidate directories for trained artifacts.
///
/// Loads accumulate across directories; scanning stops as soon as the
/// sufficiency criterion is met. Returns `None` when no combination of
/// directories yields a usable trained tier.
pub fn scan_directories(dirs: &[PathBuf]) -> Option<TrainedArtifacts> {
    let mut found = TrainedArtifacts::default();

    for dir in dirs {
        debug!(dir = %dir.display(), "checking model directory");

        if found.classifier.is_none() {
            found.classifier = load_json(dir, &RISK_MODEL_ALIASES, "risk classifier");
        }
        if found.regressor.is_none() {
            found.regressor = load_json(dir, &STABILITY_MODEL_ALIASES, "stability regressor");
        }
        for field in [
            FieldKind::Trigger,
            FieldKind::Size,
            FieldKind::Division,
            FieldKind::Reinforcement,
        ] {
            if found.has_encoder(field) {
                continue;
            }
            let what = format!("{} encoder", field.as_str());
            if let Some(artifact) =
                load_json::<EncoderArtifact>(dir, &encoder_aliases(field), &what)
            {
                found
                    .encoders
                    .push((field, CategoryEncoder::new(field, artifact.classes)));
            }
        }

        if found.is_sufficient() {
            info!(
                dir = %dir.display(),
                encoders = found.encoders.len(),
                "trained artifacts loaded"
            );
            return Some(found);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("geoshield-artifact-tests")
            .join(format!("{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_risk_model(dir: &Path, filename: &str) {
        fs::write(
            dir.join(filename),
            r#"{"weights": [0.01, -0.02, 0.3, 0.25, 0.05, 0.001], "intercept": -1.2}"#,
        )
        .unwrap();
    }

    fn write_encoder(dir: &Path, filename: &str, classes: &[&str]) {
        let body = serde_json::json!({ "classes": classes });
        fs::write(dir.join(filename), body.to_string()).unwrap();
    }

    #[test]
    fn test_scan_succeeds_with_classifier_and_three_encoders() {
        let dir = scratch_dir("sufficient");
        write_risk_model(&dir, "rockfall_risk_model.json");
        write_encoder(&dir, "le_trigger_india.json", &["Earthquake", "Rainfall"]);
        write_encoder(&dir, "risk_size_encoder.json", &["Small", "Large"]);
        write_encoder(&dir, "le_division_india.json", &["Jharkhand", "Odisha"]);

        let found = scan_directories(&[dir.clone()]).expect("trained tier should load");
        assert!(found.classifier.is_some());
        assert!(found.regressor.is_none());
        assert_eq!(found.encoders.len(), 3);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_scan_fails_without_classifier() {
        let dir = scratch_dir("no-classifier");
        write_encoder(&dir, "le_trigger_india.json", &["Earthquake"]);
        write_encoder(&dir, "le_size_india.json", &["Small"]);
        write_encoder(&dir, "le_division_india.json", &["Odisha"]);
        write_encoder(&dir, "le_reinforcement.json", &["None"]);

        assert!(scan_directories(&[dir.clone()]).is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_vendor_alias_takes_priority() {
        let dir = scratch_dir("alias-priority");
        fs::write(
            dir.join("rockfall_risk_model_india_tuned.json"),
            r#"{"weights": [1.0], "intercept": 9.0}"#,
        )
        .unwrap();
        write_risk_model(&dir, "rockfall_risk_model.json");
        write_encoder(&dir, "le_trigger_india.json", &["Earthquake"]);
        write_encoder(&dir, "le_size_india.json", &["Small"]);
        write_encoder(&dir, "le_division_india.json", &["Odisha"]);

        let found = scan_directories(&[dir.clone()]).unwrap();
        assert_eq!(found.classifier.unwrap().intercept, 9.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_artifact_is_skipped_not_fatal() {
        let dir = scratch_dir("corrupt");
        fs::write(dir.join("rockfall_risk_model_india_tuned.json"), "not json").unwrap();
        write_risk_model(&dir, "rockfall_risk_model.json");
        write_encoder(&dir, "le_trigger_india.json", &["Earthquake"]);
        write_encoder(&dir, "le_size_india.json", &["Small"]);
        write_encoder(&dir, "le_division_india.json", &["Odisha"]);

        let found = scan_directories(&[dir.clone()]).unwrap();
        // Fell through the corrupt vendor file to the legacy alias
        assert_eq!(found.classifier.unwrap().intercept, -1.2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_loads_accumulate_across_directories() {
        let dir_a = scratch_dir("accumulate-a");
        let dir_b = scratch_dir("accumulate-b");
        write_risk_model(&dir_a, "rockfall_risk_model.json");
        write_encoder(&dir_b, "le_trigger_india.json", &["Earthquake"]);
        write_encoder(&dir_b, "le_size_india.json", &["Small"]);
        write_encoder(&dir_b, "le_division_india.json", &["Odisha"]);

        let found = scan_directories(&[dir_a.clone(), dir_b.clone()]).unwrap();
        assert!(found.classifier.is_some());
        assert_eq!(found.encoders.len(), 3);

        let _ = fs::remove_dir_all(&dir_a);
        let _ = fs::remove_dir_all(&dir_b);
    }
}
