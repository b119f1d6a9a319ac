use crate::error::{Result, SyncError};
use crate::fs::FileSystem;
use crate::keys::{apply_updates, detect_format, find_existing_segments, remove_path, FlatMap};
use crate::parse::JsonParser;
use serde_json::{Map, Value};
use std::path::Path;

use super::{inner_tree, is_empty_object, wrap, wrapper_key, SourceDocument, UpdateOptions};

/// New text of the JSON file at `path`, or `None` when nothing changes
pub(super) fn updated_text(
    fs: &dyn FileSystem,
    path: &Path,
    updates: &FlatMap,
    options: &UpdateOptions,
) -> Result<Option<String>> {
    if !fs.exists(path) {
        let source = SourceDocument::read(fs, options)?.ok_or_else(|| {
            SyncError::SourceFileRequired {
                file: path.to_path_buf(),
            }
        })?;
        let wrapper = source.target_wrapper(path, options)?;
        let mut target = Map::new();
        apply_updates(&mut target, &source.inner, updates, source.mode)?;
        let tree = wrap(Value::Object(target), wrapper.as_deref());
        return JsonParser::to_string_like(&tree, Some(&source.text)).map(Some);
    }

    let original = fs.read_to_string(path)?;
    let tree = parse_object(&original, path)?;
    let wrapper = wrapper_key(&tree, options.locale.as_deref());
    let inner = inner_tree(&tree, wrapper.as_deref());

    let mut target = inner.as_object().cloned().unwrap_or_default();
    let source = if is_empty_object(&inner) {
        SourceDocument::read(fs, options)?
    } else {
        None
    };
    match &source {
        Some(source) => apply_updates(&mut target, &source.inner, updates, source.mode)?,
        None => apply_updates(&mut target, &inner, updates, detect_format(&inner))?,
    }

    let tree = wrap(Value::Object(target), wrapper.as_deref());
    let text = JsonParser::to_string_like(&tree, Some(&original))?;
    Ok((text != original).then_some(text))
}

/// Parse a translation document whose top level must be an object
fn parse_object(text: &str, path: &Path) -> Result<Value> {
    let tree = JsonParser::parse_str(text, path)?;
    if !tree.is_object() {
        return Err(SyncError::json_parse(
            path,
            "top level of a translation file must be an object",
        ));
    }
    Ok(tree)
}

/// `original` without `keys`, plus the keys that were removed
pub(super) fn without_keys(
    original: &str,
    path: &Path,
    keys: &[String],
    locale: Option<&str>,
) -> Result<(String, Vec<String>)> {
    let tree = parse_object(original, path)?;
    let wrapper = wrapper_key(&tree, locale);
    let inner = inner_tree(&tree, wrapper.as_deref());
    let mut target = inner.as_object().cloned().unwrap_or_default();

    let mut deleted = Vec::new();
    for key in keys {
        let current = Value::Object(target.clone());
        let Some(segments) = find_existing_segments(&current, key) else {
            continue;
        };
        if remove_path(&mut target, &segments).is_some() {
            deleted.push(key.clone());
        }
    }

    if deleted.is_empty() {
        return Ok((original.to_string(), deleted));
    }
    let tree = wrap(Value::Object(target), wrapper.as_deref());
    Ok((JsonParser::to_string_like(&tree, Some(original))?, deleted))
}
