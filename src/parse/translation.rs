use crate::keys::{FlatMap, StructureFormat};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// On-disk translation file format, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Json,
    Yml,
    Po,
    Pot,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yml),
            "po" => Some(Self::Po),
            "pot" => Some(Self::Pot),
            _ => None,
        }
    }

    /// PO and POT share the gettext model
    pub fn is_gettext(self) -> bool {
        matches!(self, Self::Po | Self::Pot)
    }
}

/// Gettext details carried alongside a value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_plural: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural_index: Option<usize>,
    /// Back-reference to the base msgid, set on `__plural_N` entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msgid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msgid_plural: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translator_comments: Option<String>,
}

/// API-facing translation unit: a value plus optional PO context/metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EntryMetadata>,
}

impl TranslationEntry {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            context: None,
            metadata: None,
        }
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    pub fn with_metadata(mut self, metadata: EntryMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// String form of the value, if it is a string
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// Null or the empty string: nothing to show a user
    pub fn is_blank(&self) -> bool {
        match &self.value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

/// Flattened keys of one file, in document order
pub type TranslationKeys = IndexMap<String, TranslationEntry>;

/// Wrap plain flat values as entries
pub fn entries_from_flat(flat: &FlatMap) -> TranslationKeys {
    flat.iter()
        .map(|(key, value)| (key.clone(), TranslationEntry::new(value.clone())))
        .collect()
}

/// One discovered and parsed translation file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationFile {
    pub path: PathBuf,
    pub format: FileFormat,
    pub locale: String,
    pub namespace: Option<String>,
    /// Content sits under a single `{<locale>: ...}` key
    pub has_language_wrapper: bool,
    pub structure: StructureFormat,
    /// Path relative to the discovery root with the locale replaced by
    /// `{locale}`; files in different locales pair up when these are equal
    pub locale_template: String,
    pub keys: TranslationKeys,
}

/// Split off a `{<locale>: {...}}` wrapper.
/// Returns the inner tree and whether a wrapper was present.
pub fn unwrap_language(tree: Value, locale: &str) -> (Value, bool) {
    match tree {
        Value::Object(mut map) if map.len() == 1 && map.contains_key(locale) => {
            match map.shift_remove(locale) {
                Some(inner @ Value::Object(_)) => (inner, true),
                Some(other) => {
                    map.insert(locale.to_string(), other);
                    (Value::Object(map), false)
                }
                None => (Value::Object(map), false),
            }
        }
        other => (other, false),
    }
}
