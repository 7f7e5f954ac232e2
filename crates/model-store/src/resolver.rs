//! Resolver State
//!
//! Process-wide, read-mostly state holding the active models and encoders.
//! Built once at startup before any request is served; a reload fully
//! rebuilds a new state which the boundary layer swaps in atomically.

use crate::artifact::{candidate_directories, scan_directories};
use crate::model::{LinearModel, LogisticModel, ModelTier};
use crate::synth::synthesize_models;
use category_encoder::{CategoryEncoder, FieldKind};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Resolver initialization settings
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Base directory the candidate model paths are derived from
    pub base_dir: PathBuf,
    /// Whether the synthesized tier may fit models in-process
    pub enable_synthesis: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            enable_synthesis: true,
        }
    }
}

/// The four category encoders, one per categorical field.
///
/// Fitted encoders from a trained tier replace individual slots; any slot
/// a trained tier could not fill keeps the canonical table.
#[derive(Debug, Clone)]
pub struct EncoderSet {
    pub trigger: CategoryEncoder,
    pub size: CategoryEncoder,
    pub division: CategoryEncoder,
    pub reinforcement: CategoryEncoder,
}

impl EncoderSet {
    /// All four canonical tables
    pub fn canonical() -> Self {
        Self {
            trigger: CategoryEncoder::canonical(FieldKind::Trigger),
            size: CategoryEncoder::canonical(FieldKind::Size),
            division: CategoryEncoder::canonical(FieldKind::Division),
            reinforcement: CategoryEncoder::canonical(FieldKind::Reinforcement),
        }
    }

    /// Encoder for a field
    pub fn get(&self, field: FieldKind) -> &CategoryEncoder {
        match field {
            FieldKind::Trigger => &self.trigger,
            FieldKind::Size => &self.size,
            FieldKind::Division => &self.division,
            FieldKind::Reinforcement => &self.reinforcement,
        }
    }

    fn set(&mut self, field: FieldKind, encoder: CategoryEncoder) {
        match field {
            FieldKind::Trigger => self.trigger = encoder,
            FieldKind::Size => self.size = encoder,
            FieldKind::Division => self.division = encoder,
            FieldKind::Reinforcement => self.reinforcement = encoder,
        }
    }
}

/// Health view of the resolver, for observability only
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    /// Tier serving risk predictions
    pub risk_tier: ModelTier,
    /// Tier serving stability predictions
    pub stability_tier: ModelTier,
    /// Fields whose encoders came from fitted artifacts
    pub fitted_encoders: Vec<String>,
    /// Fields with a usable encoder (always all four)
    pub encoders_available: Vec<String>,
    /// Model directories that existed and were probed
    pub directories_probed: Vec<String>,
}

/// Valid category values per field, for client choice lists
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOptions {
    pub triggers: Vec<String>,
    pub sizes: Vec<String>,
    pub divisions: Vec<String>,
    pub reinforcements: Vec<String>,
}

/// Resolved models and encoders for both model kinds.
///
/// No field is mutated after initialization completes, so concurrent reads
/// need no locking.
#[derive(Debug, Clone)]
pub struct ResolverState {
    /// Tier the risk engine operates in
    pub risk_tier: ModelTier,
    /// Tier the stability engine operates in
    pub stability_tier: ModelTier,
    /// Loaded or synthesized risk classifier
    pub risk_classifier: Option<LogisticModel>,
    /// Loaded or synthesized stability regressor
    pub stability_regressor: Option<LinearModel>,
    /// Active encoders for all four categorical fields
    pub encoders: EncoderSet,
    /// Fields whose encoders were loaded from artifacts
    pub fitted_fields: Vec<FieldKind>,
    /// Directories probed during initialization
    pub probed_dirs: Vec<PathBuf>,
}

impl ResolverState {
    /// Initialize by attempting the tiers in order: trained artifacts,
    /// in-process synthesis, then heuristic tables only.
    ///
    /// Never fails; always terminates in one of the three tiers. Re-running
    /// is idempotent and serves as the reload operation.
    pub fn initialize(config: &ResolverConfig) -> Self {
        let dirs = candidate_directories(&config.base_dir);
        info!(probed = dirs.len(), "initializing model resolver");

        if let Some(artifacts) = scan_directories(&dirs) {
            let mut encoders = EncoderSet::canonical();
            let mut fitted_fields = Vec::new();
            for (field, encoder) in artifacts.encoders {
                encoders.set(field, encoder);
                fitted_fields.push(field);
            }
            let stability_tier = if artifacts.regressor.is_some() {
                ModelTier::Trained
            } else {
                warn!("stability regressor missing from trained artifacts, stability engine stays heuristic");
                ModelTier::None
            };
            info!("resolver running on trained tier");
            return Self {
                risk_tier: ModelTier::Trained,
                stability_tier,
                risk_classifier: artifacts.classifier,
                stability_regressor: artifacts.regressor,
                encoders,
                fitted_fields,
                probed_dirs: dirs,
            };
        }

        if config.enable_synthesis {
            warn!("no trained artifacts found, synthesizing models in-process");
            let (classifier, regressor) = synthesize_models();
            return Self {
                risk_tier: ModelTier::Synthesized,
                stability_tier: ModelTier::Synthesized,
                risk_classifier: Some(classifier),
                stability_regressor: Some(regressor),
                encoders: EncoderSet::canonical(),
                fitted_fields: Vec::new(),
                probed_dirs: dirs,
            };
        }

        warn!("model synthesis disabled, falling back to heuristic tables");
        Self {
            probed_dirs: dirs,
            ..Self::heuristic_only()
        }
    }

    /// A pure heuristic-tier state: canonical tables, no statistical models
    pub fn heuristic_only() -> Self {
        Self {
            risk_tier: ModelTier::None,
            stability_tier: ModelTier::None,
            risk_classifier: None,
            stability_regressor: None,
            encoders: EncoderSet::canonical(),
            fitted_fields: Vec::new(),
            probed_dirs: Vec::new(),
        }
    }

    /// Health view of the current tiers and encoders
    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot {
            risk_tier: self.risk_tier,
            stability_tier: self.stability_tier,
            fitted_encoders: self
                .fitted_fields
                .iter()
                .map(|f| f.as_str().to_string())
                .collect(),
            encoders_available: [
                FieldKind::Trigger,
                FieldKind::Size,
                FieldKind::Division,
                FieldKind::Reinforcement,
            ]
            .iter()
            .map(|f| f.as_str().to_string())
            .collect(),
            directories_probed: self
                .probed_dirs
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        }
    }

    /// Encode a categorical value through the field's active encoder.
    ///
    /// Fitted artifact encoders are exact-match with a hash fallback on
    /// unknown categories. Canonical tables get the full lenient chain,
    /// so casing and near-miss labels still land on their table code.
    pub fn encode_category(&self, field: FieldKind, value: &str) -> u32 {
        let encoder = self.encoders.get(field);
        if self.fitted_fields.contains(&field) {
            match encoder.transform(value) {
                Ok(code) => code,
                Err(e) => {
                    warn!(error = %e, "category unknown to fitted encoder, hashing");
                    encoder.fallback_code(value)
                }
            }
        } else {
            encoder.encode_lenient(value)
        }
    }

    /// Sorted category labels per field, from whichever encoders the
    /// active tier installed
    pub fn options(&self) -> CategoryOptions {
        let sorted = |encoder: &CategoryEncoder| {
            let mut labels = encoder.labels().to_vec();
            labels.sort();
            labels
        };
        CategoryOptions {
            triggers: sorted(&self.encoders.trigger),
            sizes: sorted(&self.encoders.size),
            divisions: sorted(&self.encoders.division),
            reinforcements: sorted(&self.encoders.reinforcement),
        }
    }
}
