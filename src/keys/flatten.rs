use crate::error::{Result, SyncError};
use serde_json::{Map, Value};

/// Ordered dot-path → value map
pub type FlatMap = Map<String, Value>;

/// What to do when a write meets an existing node of the other kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Report a `KeyCollision`
    Reject,
    /// The incoming write replaces whatever is in the way
    Overwrite,
}

/// Flatten a nested tree into dot-delimited paths.
///
/// Arrays are leaves and stored whole. Empty objects produce no leaves.
/// A non-object root flattens to an empty map.
pub fn flatten(tree: &Value) -> FlatMap {
    let mut flat = FlatMap::new();
    if let Value::Object(map) = tree {
        flatten_into(map, "", &mut flat, &mut |_| {});
    }
    flat
}

/// Like [`flatten`], but two source paths producing the same flat key
/// (e.g. a literal `"a.b"` next to `{"a": {"b": ..}}`) are an error.
pub fn flatten_strict(tree: &Value) -> Result<FlatMap> {
    let mut flat = FlatMap::new();
    let mut duplicate = None;
    if let Value::Object(map) = tree {
        flatten_into(map, "", &mut flat, &mut |key| {
            if duplicate.is_none() {
                duplicate = Some(key.to_string());
            }
        });
    }
    match duplicate {
        Some(key) => Err(SyncError::key_collision(key.clone(), key, "key")),
        None => Ok(flat),
    }
}

fn flatten_into(
    map: &Map<String, Value>,
    prefix: &str,
    flat: &mut FlatMap,
    on_duplicate: &mut dyn FnMut(&str),
) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(child) => flatten_into(child, &path, flat, on_duplicate),
            leaf => {
                if flat.contains_key(&path) {
                    on_duplicate(&path);
                }
                flat.insert(path, leaf.clone());
            }
        }
    }
}

/// Rebuild a nested tree from a flat map. Every key is split on `.`.
pub fn unflatten(flat: &FlatMap) -> Result<Value> {
    let mut root = Map::new();
    for (key, value) in flat {
        let segments = split_key(key);
        insert_path(&mut root, key, &segments, value.clone(), CollisionPolicy::Reject)?;
    }
    Ok(Value::Object(root))
}

pub fn split_key(key: &str) -> Vec<String> {
    key.split('.').map(str::to_string).collect()
}

/// Write `value` at `segments`, creating intermediate objects.
pub fn insert_path(
    map: &mut Map<String, Value>,
    key: &str,
    segments: &[String],
    value: Value,
    policy: CollisionPolicy,
) -> Result<()> {
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = map;
    for (depth, segment) in parents.iter().enumerate() {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            match policy {
                CollisionPolicy::Overwrite => *slot = Value::Object(Map::new()),
                CollisionPolicy::Reject => {
                    return Err(SyncError::key_collision(
                        key,
                        segments[..=depth].join("."),
                        "value",
                    ))
                }
            }
        }
        current = match slot {
            Value::Object(child) => child,
            _ => return Err(SyncError::key_collision(key, segments[..=depth].join("."), "value")),
        };
    }

    if policy == CollisionPolicy::Reject && !value.is_object() {
        if let Some(Value::Object(existing)) = current.get(last) {
            if !existing.is_empty() {
                return Err(SyncError::key_collision(key, segments.join("."), "object"));
            }
        }
    }
    current.insert(last.clone(), value);
    Ok(())
}

/// Look up the value at `segments`
pub fn get_path<'a>(tree: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(tree, |node, segment| node.as_object()?.get(segment))
}

/// Remove the leaf at `segments`. Parents left empty by the removal are
/// removed as well; `map` itself is never removed.
pub fn remove_path(map: &mut Map<String, Value>, segments: &[String]) -> Option<Value> {
    let (first, rest) = segments.split_first()?;
    if rest.is_empty() {
        return map.shift_remove(first.as_str());
    }

    let child = map.get_mut(first.as_str())?.as_object_mut()?;
    let removed = remove_path(child, rest)?;
    if child.is_empty() {
        map.shift_remove(first.as_str());
    }
    Some(removed)
}

/// Find how an existing leaf for `key` is laid out in `tree`, allowing any
/// mix of literal dotted keys and nesting (`{"errors": {"not.found": ..}}`).
pub fn find_existing_segments(tree: &Value, key: &str) -> Option<Vec<String>> {
    let parts: Vec<&str> = key.split('.').collect();
    let map = tree.as_object()?;
    find_in(map, &parts)
}

fn find_in(map: &Map<String, Value>, parts: &[&str]) -> Option<Vec<String>> {
    for take in (1..=parts.len()).rev() {
        let candidate = parts[..take].join(".");
        let Some(child) = map.get(&candidate) else {
            continue;
        };
        if take == parts.len() {
            if !child.is_object() {
                return Some(vec![candidate]);
            }
            continue;
        }
        if let Some(child_map) = child.as_object() {
            if let Some(mut rest) = find_in(child_map, &parts[take..]) {
                rest.insert(0, candidate);
                return Some(rest);
            }
        }
    }
    None
}
