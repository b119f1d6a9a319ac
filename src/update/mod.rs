//! Shape-preserving writes into JSON and YAML translation files.

mod json;
mod yaml;
pub mod yaml_doc;
pub mod yaml_scalar;

use crate::config::patterns::is_valid_locale;
use crate::error::{Result, SyncError};
use crate::fs::FileSystem;
use crate::keys::{detect_format, FlatMap, StructureFormat};
use crate::logger::Logger;
use crate::parse::{FileFormat, JsonParser, YamlParser};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub use yaml_doc::YamlDocument;

/// How to resolve a target file's wrapper and shape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Locale of the target; names the language wrapper
    pub locale: Option<String>,
    /// Peer source file copied when the target does not exist yet
    pub source_file_path: Option<PathBuf>,
    pub source_locale: Option<String>,
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>, locale: impl Into<String>) -> Self {
        self.source_file_path = Some(path.into());
        self.source_locale = Some(locale.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Every non-null key of the request, in request order
    pub updated_keys: Vec<String>,
    /// The file did not exist before
    pub created: bool,
}

/// Write `translations` into the JSON or YAML file at `path`, keeping its
/// layout. `null` values are ignored. A missing target is created from the
/// shape of `options.source_file_path` (required for JSON).
pub fn update_translation_file(
    fs: &dyn FileSystem,
    path: &Path,
    translations: &IndexMap<String, Value>,
    options: &UpdateOptions,
    logger: &dyn Logger,
) -> Result<UpdateOutcome> {
    let updates: FlatMap = translations
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if updates.is_empty() {
        logger.log(&format!("{}: nothing to write", path.display()));
        return Ok(UpdateOutcome::default());
    }

    let format = editable_format(path)?;
    let created = !fs.exists(path);
    let rendered = match format {
        FileFormat::Json => json::updated_text(fs, path, &updates, options)?,
        _ => yaml::updated_text(fs, path, &updates, options, logger)?,
    };

    match rendered {
        Some(text) => {
            if created {
                if let Some(parent) = path.parent() {
                    fs.create_dir_all(parent)?;
                }
            }
            fs.write(path, &text)?;
            logger.log(&format!(
                "{} {} ({} keys)",
                if created { "Created" } else { "Updated" },
                path.display(),
                updates.len()
            ));
        }
        None => logger.log(&format!("{}: already up to date", path.display())),
    }

    Ok(UpdateOutcome {
        updated_keys: updates.keys().cloned().collect(),
        created,
    })
}

/// Remove `keys` from the JSON or YAML file at `path`, pruning parents the
/// removal leaves empty (never the language wrapper). Returns the keys that
/// were actually present.
pub fn delete_keys_from_translation_file(
    fs: &dyn FileSystem,
    path: &Path,
    keys: &[String],
    locale: Option<&str>,
    logger: &dyn Logger,
) -> Result<Vec<String>> {
    if !fs.exists(path) {
        logger.warn(&format!("{} does not exist; nothing to delete", path.display()));
        return Ok(Vec::new());
    }

    let format = editable_format(path)?;
    let original = fs.read_to_string(path)?;
    let (rendered, deleted) = match format {
        FileFormat::Json => json::without_keys(&original, path, keys, locale)?,
        _ => yaml::without_keys(&original, path, keys, locale, logger)?,
    };

    if !deleted.is_empty() {
        fs.write(path, &rendered)?;
        logger.log(&format!("Deleted {} keys from {}", deleted.len(), path.display()));
    }
    Ok(deleted)
}

fn editable_format(path: &Path) -> Result<FileFormat> {
    match FileFormat::from_path(path) {
        Some(format @ (FileFormat::Json | FileFormat::Yml)) => Ok(format),
        _ => Err(SyncError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// The language wrapper key of `tree`: `locale` when given, otherwise any
/// sole top-level key that looks like a locale. The wrapped value must be a
/// mapping, or null for a locale file with nothing in it yet (`fr:`).
pub(crate) fn wrapper_key(tree: &Value, locale: Option<&str>) -> Option<String> {
    let map = tree.as_object()?;
    if map.len() != 1 {
        return None;
    }
    let (key, value) = map.iter().next()?;
    let matches = match locale {
        Some(locale) => key == locale,
        None => is_valid_locale(key),
    };
    (matches && (value.is_object() || value.is_null())).then(|| key.clone())
}

/// Inner tree of `tree` below `wrapper`; a null wrapper holds nothing
pub(crate) fn inner_tree(tree: &Value, wrapper: Option<&str>) -> Value {
    match wrapper.and_then(|key| tree.get(key)) {
        Some(Value::Null) => Value::Object(Map::new()),
        Some(inner) => inner.clone(),
        None => tree.clone(),
    }
}

pub(crate) fn wrap(inner: Value, wrapper: Option<&str>) -> Value {
    match wrapper {
        Some(key) => {
            let mut map = Map::new();
            map.insert(key.to_string(), inner);
            Value::Object(map)
        }
        None => inner,
    }
}

/// Parsed peer source file used to shape a new or empty target
pub(crate) struct SourceDocument {
    pub text: String,
    pub inner: Value,
    pub wrapped: bool,
    pub mode: StructureFormat,
}

impl SourceDocument {
    pub fn read(fs: &dyn FileSystem, options: &UpdateOptions) -> Result<Option<Self>> {
        let Some(path) = options.source_file_path.as_deref() else {
            return Ok(None);
        };
        if !fs.exists(path) {
            return Ok(None);
        }

        let text = fs.read_to_string(path)?;
        let tree = match FileFormat::from_path(path) {
            Some(FileFormat::Json) => JsonParser::parse_str(&text, path)?,
            Some(FileFormat::Yml) => YamlParser::parse_str(&text, path)?,
            _ => return Err(SyncError::UnsupportedFormat(path.to_path_buf())),
        };
        let wrapper = wrapper_key(&tree, options.source_locale.as_deref());
        let inner = inner_tree(&tree, wrapper.as_deref());
        let mode = detect_format(&inner);
        Ok(Some(Self {
            text,
            inner,
            wrapped: wrapper.is_some(),
            mode,
        }))
    }

    /// Wrapper for a new target copied from this source
    pub fn target_wrapper(&self, target: &Path, options: &UpdateOptions) -> Result<Option<String>> {
        if !self.wrapped {
            return Ok(None);
        }
        options
            .locale
            .clone()
            .map(Some)
            .ok_or_else(|| SyncError::LocaleRequired {
                file: target.to_path_buf(),
            })
    }
}

/// Empty object check that treats a missing tree as empty
pub(crate) fn is_empty_object(tree: &Value) -> bool {
    tree.as_object().map(Map::is_empty).unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::logger::{LogLevel, MemoryLogger, SilentLogger};
    use serde_json::json;

    fn translations(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_wrapper_key() {
        assert_eq!(wrapper_key(&json!({"fr": {"a": "b"}}), None), Some("fr".to_string()));
        assert_eq!(wrapper_key(&json!({"fr": {"a": "b"}}), Some("de")), None);
        assert_eq!(wrapper_key(&json!({"home": {"a": "b"}}), None), None);
        assert_eq!(wrapper_key(&json!({"fr": "x"}), None), None);
        assert_eq!(wrapper_key(&json!({"fr": null}), Some("fr")), Some("fr".to_string()));
        assert_eq!(inner_tree(&json!({"fr": null}), Some("fr")), json!({}));
    }

    #[test]
    fn test_null_values_are_filtered() {
        let fs = MemoryFileSystem::new().with_file("/app/fr.json", "{\n  \"a\": \"A\"\n}\n");
        let outcome = update_translation_file(
            &fs,
            Path::new("/app/fr.json"),
            &translations(&[("a", Value::Null), ("b", json!("B"))]),
            &UpdateOptions::new().with_locale("fr"),
            &SilentLogger,
        )
        .unwrap();

        assert_eq!(outcome.updated_keys, vec!["b".to_string()]);
        assert!(!outcome.created);
        assert_eq!(
            fs.get("/app/fr.json").unwrap(),
            "{\n  \"a\": \"A\",\n  \"b\": \"B\"\n}\n"
        );
    }

    #[test]
    fn test_only_nulls_writes_nothing() {
        let fs = MemoryFileSystem::new();
        let outcome = update_translation_file(
            &fs,
            Path::new("/app/fr.json"),
            &translations(&[("a", Value::Null)]),
            &UpdateOptions::new(),
            &SilentLogger,
        )
        .unwrap();
        assert_eq!(outcome, UpdateOutcome::default());
        assert!(fs.get("/app/fr.json").is_none());
    }

    #[test]
    fn test_po_targets_are_rejected() {
        let fs = MemoryFileSystem::new();
        let err = update_translation_file(
            &fs,
            Path::new("/app/fr.po"),
            &translations(&[("a", json!("b"))]),
            &UpdateOptions::new(),
            &SilentLogger,
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_delete_from_missing_file_is_empty() {
        let fs = MemoryFileSystem::new();
        let logger = MemoryLogger::new();
        let deleted = delete_keys_from_translation_file(
            &fs,
            Path::new("/app/fr.yml"),
            &["a".to_string()],
            Some("fr"),
            &logger,
        )
        .unwrap();
        assert!(deleted.is_empty());
        assert_eq!(logger.messages(LogLevel::Warn).len(), 1);
    }

    #[test]
    fn test_unchanged_file_is_not_rewritten() {
        let original = "{\n    \"a\": \"A\"\n}";
        let fs = MemoryFileSystem::new().with_file("/app/fr.json", original);
        let logger = MemoryLogger::new();
        update_translation_file(
            &fs,
            Path::new("/app/fr.json"),
            &translations(&[("a", json!("A"))]),
            &UpdateOptions::new(),
            &logger,
        )
        .unwrap();
        assert_eq!(fs.get("/app/fr.json").unwrap(), original);
        assert!(logger
            .messages(LogLevel::Info)
            .iter()
            .any(|m| m.contains("already up to date")));
    }
}
