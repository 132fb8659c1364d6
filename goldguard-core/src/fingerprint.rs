//! Deterministic fingerprints for call arguments.
//!
//! A snapshot is keyed by the exact input that produced it. [`canonical`]
//! serializes the arguments to a canonical JSON string: sequences keep their
//! order, object keys come out sorted (serde_json's default map is a BTreeMap),
//! so identical input always yields the identical string. [`digest`] condenses
//! that string into a SHA-256 hex digest for file-backed stores.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Serialize call arguments into the canonical prompt string.
pub fn canonical<T: Serialize>(args: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_value(args)?.to_string())
}

/// SHA-256 hex digest of a canonical prompt string.
pub fn digest(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hex::encode(hasher.finalize())
}
