//! Condition dataset loading.
//!
//! A dataset is a JSON array of condition objects. Loading is forgiving at
//! the record level: non-object entries are skipped, and objects that do not
//! deserialize cleanly are salvaged field by field so one bad record never
//! aborts the load. Only a document that is not a JSON array is an error.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{info, warn};

use pathomap_contracts::{
    condition::Condition,
    error::{PathomapError, PathomapResult},
};

/// The sample dataset bundled with the workspace.
pub const SAMPLE_DATASET: &str = include_str!("../../../data/conditions.json");

/// Deserialize one field, falling back to its empty value.
fn salvage_field<T: DeserializeOwned + Default>(object: &Map<String, Value>, key: &str) -> T {
    object
        .get(key)
        .cloned()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

/// Rebuild a condition from whichever fields still have a usable shape.
fn salvage(object: &Map<String, Value>) -> Condition {
    let id = match object.get("id") {
        Some(Value::Number(n)) => n.to_string(),
        _ => salvage_field(object, "id"),
    };
    Condition {
        id,
        category: salvage_field(object, "category"),
        name: salvage_field(object, "name"),
        common_pathogens: salvage_field(object, "commonPathogens"),
        empiric_therapy: salvage_field(object, "empiricTherapy"),
        duration: salvage_field(object, "duration"),
        notes: salvage_field(object, "notes"),
    }
}

/// Parse a JSON array of conditions.
///
/// Returns `PathomapError::DatasetError` if the text is not JSON or the top
/// level is not an array.
pub fn load_conditions_from_str(s: &str) -> PathomapResult<Vec<Condition>> {
    let document: Value = serde_json::from_str(s).map_err(|e| PathomapError::DatasetError {
        reason: format!("failed to parse dataset JSON: {}", e),
    })?;
    let Value::Array(entries) = document else {
        return Err(PathomapError::DatasetError {
            reason: "dataset must be a JSON array of condition objects".to_string(),
        });
    };

    let total = entries.len();
    let mut conditions = Vec::with_capacity(total);
    let mut salvaged = 0usize;
    for (position, entry) in entries.into_iter().enumerate() {
        let Value::Object(object) = entry else {
            warn!(position, "dataset entry is not an object; skipped");
            continue;
        };
        match serde_json::from_value::<Condition>(Value::Object(object.clone())) {
            Ok(condition) => conditions.push(condition),
            Err(e) => {
                let condition = salvage(&object);
                warn!(
                    position,
                    id = %condition.id,
                    error = %e,
                    "condition did not deserialize cleanly; salvaged field by field"
                );
                salvaged += 1;
                conditions.push(condition);
            }
        }
    }

    info!(
        entries = total,
        conditions = conditions.len(),
        salvaged,
        skipped = total - conditions.len(),
        "dataset loaded"
    );
    Ok(conditions)
}

/// Read the file at `path` and parse it as a condition dataset.
pub fn load_conditions_from_file(path: &Path) -> PathomapResult<Vec<Condition>> {
    let contents = std::fs::read_to_string(path).map_err(|e| PathomapError::DatasetError {
        reason: format!("failed to read dataset file '{}': {}", path.display(), e),
    })?;
    load_conditions_from_str(&contents)
}

/// Parse the bundled sample dataset.
pub fn sample_conditions() -> PathomapResult<Vec<Condition>> {
    load_conditions_from_str(SAMPLE_DATASET)
}
