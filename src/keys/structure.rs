use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::flatten::{
    find_existing_segments, get_path, insert_path, remove_path, split_key, CollisionPolicy,
    FlatMap,
};

/// Overall key layout of a translation document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureFormat {
    /// Every top-level value is a leaf; keys are literal dotted paths
    Flat,
    /// Every top-level value is an object
    Nested,
    /// A bit of both
    Mixed,
}

/// Classify the top level of `tree`. An empty document counts as nested.
pub fn detect_format(tree: &Value) -> StructureFormat {
    let Some(map) = tree.as_object() else {
        return StructureFormat::Flat;
    };
    if map.is_empty() {
        return StructureFormat::Nested;
    }

    let objects = map.values().filter(|v| v.is_object()).count();
    if objects == map.len() {
        StructureFormat::Nested
    } else if objects == 0 {
        StructureFormat::Flat
    } else {
        StructureFormat::Mixed
    }
}

/// Resolve the path segments `key` should be written at in a document shaped
/// like `reference`.
///
/// An existing leaf always wins, however it is laid out. Otherwise `Flat`
/// keeps the key literal, `Nested` splits it, and `Mixed` splits it only when
/// a leading part of the path already exists as an object.
pub fn key_segments(reference: &Value, key: &str, mode: StructureFormat) -> Vec<String> {
    if let Some(existing) = find_existing_segments(reference, key) {
        return existing;
    }

    match mode {
        StructureFormat::Flat => vec![key.to_string()],
        StructureFormat::Nested => split_key(key),
        StructureFormat::Mixed => {
            let segments = split_key(key);
            let has_nested_parent = segments.len() > 1
                && get_path(reference, &segments[..1])
                    .map(Value::is_object)
                    .unwrap_or(false);
            if has_nested_parent {
                segments
            } else {
                vec![key.to_string()]
            }
        }
    }
}

/// Merge flat updates back into `original` without changing its shape.
/// `null` updates remove the key.
pub fn preserve_structure(
    original: &Value,
    updates: &FlatMap,
    mode: StructureFormat,
) -> Result<Value> {
    let mut result = original.as_object().cloned().unwrap_or_default();
    apply_updates(&mut result, original, updates, mode)?;
    Ok(Value::Object(result))
}

/// Apply `updates` to `target`, resolving each key against `reference`.
/// `reference` may be a different document than `target` (a peer source file
/// when a new target is being created).
pub fn apply_updates(
    target: &mut Map<String, Value>,
    reference: &Value,
    updates: &FlatMap,
    mode: StructureFormat,
) -> Result<()> {
    let current = Value::Object(target.clone());
    for (key, value) in updates {
        let segments = match find_existing_segments(&current, key) {
            Some(existing) => existing,
            None => key_segments(reference, key, mode),
        };
        if value.is_null() {
            remove_path(target, &segments);
        } else {
            insert_path(target, key, &segments, value.clone(), CollisionPolicy::Overwrite)?;
        }
    }
    Ok(())
}
