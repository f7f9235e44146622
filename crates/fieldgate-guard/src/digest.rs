//! Digest Function - one-way masking of shared values
//!
//! Shared values never leave the evaluator raw: they are replaced by the
//! hex-encoded SHA-256 of their canonical string form. The digest is
//! deterministic and unkeyed — it anonymizes, it does not encrypt.

use crate::telemetry::FieldValue;
use sha2::{Digest, Sha256};

/// Digest an arbitrary string form
pub fn digest_str(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}

/// Digest a field value via its canonical string form
pub fn digest_value(value: &FieldValue) -> String {
    digest_str(&value.to_string())
}
