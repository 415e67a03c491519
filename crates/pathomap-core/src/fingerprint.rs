//! Snapshot fingerprinting.
//!
//! A fingerprint identifies the content of a condition dataset so a session
//! can tell whether a refresh actually changed anything.

use sha2::{Digest, Sha256};

use pathomap_contracts::condition::Condition;

/// Compute the SHA-256 fingerprint of a condition dataset.
///
/// The hash commits to the condition count (u64 little-endian) followed by
/// each condition's compact JSON, in dataset order. Equal datasets produce
/// equal fingerprints; any edit to a condition or to their order changes it.
///
/// Returns the digest as a lowercase hex string.
pub fn fingerprint(conditions: &[Condition]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((conditions.len() as u64).to_le_bytes());
    for condition in conditions {
        // Maps are ordered and every field is plain data, so the encoding is
        // deterministic and cannot fail.
        let json = serde_json::to_vec(condition).expect("Condition must always be serializable to JSON");
        hasher.update(&json);
    }
    hex::encode(hasher.finalize())
}
