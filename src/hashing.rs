//! Hashing System - SHA-256 over Canonical JSON
//!
//! Equal layouts hash equal, whatever order their JSON keys were built in.

use sha2::{Sha256, Digest};
use serde::Serialize;
use serde_json::Value;

/// Lowercase hex SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Compact JSON with object keys in sorted order.
///
/// Round-trips through `serde_json::Value`, whose maps are ordered by key
/// as long as the `preserve_order` feature stays off.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let value: Value = serde_json::to_value(value)?;
    serde_json::to_string(&value)
}

/// Content hash of rendered layout trees
pub fn compute_layout_hash<T: Serialize>(layout: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(layout)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// job_hash = sha256(profile_id + profile_version + canonical_request + engine_version)
pub fn compute_job_hash(
    profile_id: &str,
    profile_version: &str,
    request: &impl Serialize,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let canonical_request = canonical_json(request)?;
    let combined = format!(
        "{}:{}:{}:{}",
        profile_id, profile_version, canonical_request, engine_version
    );
    Ok(sha256_hex(combined.as_bytes()))
}
