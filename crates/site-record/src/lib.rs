//! Site Attribute Records
//!
//! Flat key/value records submitted for one prediction, with numeric
//! coercion and required-field validation.

mod record;

pub use record::{AttributeRecord, FieldValue};

use thiserror::Error;

/// Errors raised while reading a request record
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    /// Required keys absent from the request
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A value could not be interpreted as a number
    #[error("field {field} is not numeric: {value:?}")]
    NotNumeric { field: String, value: String },
}
