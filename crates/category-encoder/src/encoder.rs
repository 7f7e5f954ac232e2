//! Category Encoder Implementation

use crate::{stable_hash, EncodeError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The four categorical fields the engines encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Landslide trigger type
    Trigger,
    /// Landslide size class
    Size,
    /// Administrative division
    Division,
    /// Slope reinforcement type
    Reinforcement,
}

impl FieldKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Trigger => "trigger",
            FieldKind::Size => "size",
            FieldKind::Division => "division",
            FieldKind::Reinforcement => "reinforcement",
        }
    }

    /// Canonical label table for this field, in code order
    pub fn canonical_labels(&self) -> &'static [&'static str] {
        match self {
            FieldKind::Trigger => &[
                "Construction",
                "Earthquake",
                "Human Activity",
                "Mining",
                "Rainfall",
                "Natural Erosion",
            ],
            FieldKind::Size => &["Very Large", "Large", "Medium", "Small"],
            FieldKind::Division => &[
                "Chhattisgarh",
                "Jharkhand",
                "Odisha",
                "Karnataka",
                "Madhya Pradesh",
                "Maharashtra",
            ],
            FieldKind::Reinforcement => &["None", "Anchor", "Mesh", "Retaining Wall"],
        }
    }
}

/// Ordered mapping from category label to a dense integer code `0..n-1`.
///
/// One instance per categorical field. Fixed for the lifetime of a resolver
/// tier: trained tiers carry fitted label lists loaded from artifacts, the
/// heuristic tier uses the hand-authored canonical tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEncoder {
    field: FieldKind,
    labels: Vec<String>,
}

impl CategoryEncoder {
    /// Create an encoder over an explicit label list (fitted vocabulary)
    pub fn new(field: FieldKind, labels: Vec<String>) -> Self {
        Self { field, labels }
    }

    /// Create an encoder over the hand-authored canonical table
    pub fn canonical(field: FieldKind) -> Self {
        Self {
            field,
            labels: field
                .canonical_labels()
                .iter()
                .map(|l| l.to_string())
                .collect(),
        }
    }

    /// Field this encoder serves
    pub fn field(&self) -> FieldKind {
        self.field
    }

    /// Number of known categories
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the vocabulary is empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Known labels in code order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Strict encoding: exact match against the fitted vocabulary only.
    ///
    /// Mirrors a fitted label encoder's transform. Callers catch
    /// `UnknownCategory` and redirect to [`encode_lenient`](Self::encode_lenient).
    pub fn transform(&self, value: &str) -> Result<u32, EncodeError> {
        self.labels
            .iter()
            .position(|l| l == value)
            .map(|i| i as u32)
            .ok_or_else(|| EncodeError::UnknownCategory {
                field: self.field.as_str(),
                value: value.to_string(),
            })
    }

    /// Lenient encoding, always producing a code in `[0, n)`.
    ///
    /// Tries, in order: exact match, case-insensitive match, substring
    /// containment in either direction, then a deterministic hash reduced
    /// modulo the table size. The hash path flags an unrecognized category.
    pub fn encode_lenient(&self, value: &str) -> u32 {
        if self.labels.is_empty() {
            return 0;
        }

        if let Some(i) = self.labels.iter().position(|l| l == value) {
            return i as u32;
        }

        let value_lower = value.to_lowercase();
        if let Some(i) = self
            .labels
            .iter()
            .position(|l| l.to_lowercase() == value_lower)
        {
            return i as u32;
        }

        if let Some(i) = self.labels.iter().position(|l| {
            let label_lower = l.to_lowercase();
            label_lower.contains(&value_lower) || value_lower.contains(&label_lower)
        }) {
            return i as u32;
        }

        self.fallback_code(value)
    }

    /// Last-resort deterministic code for an unrecognized value: a stable
    /// hash reduced modulo the table size, always in `[0, n)`. Flagged in
    /// the log since it indicates vocabulary drift.
    pub fn fallback_code(&self, value: &str) -> u32 {
        if self.labels.is_empty() {
            return 0;
        }
        let code = (stable_hash(value) % self.labels.len() as u64) as u32;
        warn!(
            field = self.field.as_str(),
            value, code, "unrecognized category, using hash fallback encoding"
        );
        code
    }
}
