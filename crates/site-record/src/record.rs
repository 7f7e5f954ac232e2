//! Attribute Record Implementation

use crate::RecordError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single field value: numeric or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// Immutable mapping from field name to value for one prediction request.
///
/// Constructed per request and discarded after the response is produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl AttributeRecord {
    /// Build a record from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Whether the record contains a key
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields in the record
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record is empty
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read a field as a number, coercing numeric text like "23.5"
    pub fn number(&self, key: &str) -> Result<f64, RecordError> {
        match self.fields.get(key) {
            Some(FieldValue::Number(n)) => Ok(*n),
            Some(FieldValue::Text(s)) => {
                s.trim().parse::<f64>().map_err(|_| RecordError::NotNumeric {
                    field: key.to_string(),
                    value: s.clone(),
                })
            }
            None => Err(RecordError::MissingFields(vec![key.to_string()])),
        }
    }

    /// Read a field as a number, substituting a default when absent
    pub fn number_or(&self, key: &str, default: f64) -> Result<f64, RecordError> {
        if self.contains(key) {
            self.number(key)
        } else {
            Ok(default)
        }
    }

    /// Read a field as text, rendering numbers with their display form
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key) {
            Some(FieldValue::Text(s)) => Some(s.clone()),
            Some(FieldValue::Number(n)) => Some(n.to_string()),
            None => None,
        }
    }

    /// Read a field as text, substituting a default when absent
    pub fn text_or(&self, key: &str, default: &str) -> String {
        self.text(key).unwrap_or_else(|| default.to_string())
    }

    /// Check that every listed key is present, reporting all misses at once
    pub fn require(&self, keys: &[&str]) -> Result<(), RecordError> {
        let missing: Vec<String> = keys
            .iter()
            .filter(|k| !self.contains(k))
            .map(|k| k.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RecordError::MissingFields(missing))
        }
    }
}
