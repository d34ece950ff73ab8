//! Config fingerprinting
//!
//! Every run result carries the SHA-256 of its canonical JSON config so two
//! summaries can be checked for coming from identical parameters.

use crate::orchestrator::engine::SimulationError;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a config for identification
///
/// Uses canonical JSON (sorted keys) so field declaration order does not
/// affect the hash.
///
/// # Arguments
///
/// * `config` - Any serializable config
///
/// # Returns
///
/// Lowercase hex digest (64 characters)
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Check that a recorded hash matches `config`
pub fn verify_config_hash<T: Serialize>(config: &T, expected: &str) -> Result<(), SimulationError> {
    let actual = compute_config_hash(config)?;
    if actual != expected {
        return Err(SimulationError::InvalidConfig(format!(
            "Config hash mismatch: expected {}, got {}",
            expected, actual
        )));
    }
    Ok(())
}
