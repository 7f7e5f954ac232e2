//! Categorical Encoding
//!
//! Maps free-text category labels (trigger type, size class, administrative
//! division, reinforcement type) to dense integer codes. Tolerates typos,
//! casing differences, and unseen values via a chain of fallbacks ending in
//! a deterministic hash.

mod encoder;

pub use encoder::{CategoryEncoder, FieldKind};

use thiserror::Error;

/// Errors during categorical encoding
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EncodeError {
    /// Value not present in a fitted encoder's vocabulary
    #[error("unknown {field} category: {value:?}")]
    UnknownCategory { field: &'static str, value: String },
}

/// FNV-1a 64-bit hash. Stable across runs and platforms, used for the
/// last-resort category encoding and the location-seeded perturbation.
pub fn stable_hash(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
