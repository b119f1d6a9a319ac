use crate::error::{Result, SyncError};
use crate::parse::{EntryMetadata, TranslationFile};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::missing::{MissingKey, MissingTranslationRecord};

/// Largest number of keys sent in one translation request
pub const DEFAULT_MAX_BATCH_SIZE: usize = 200;

/// Keys of one source file to translate into `locales`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationBatch {
    pub source_path: PathBuf,
    pub locales: Vec<String>,
    pub keys: IndexMap<String, MissingKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchError {
    MissingSourceFile { path: PathBuf },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    pub batches: Vec<TranslationBatch>,
    pub errors: Vec<BatchError>,
}

/// One key as sent to the translation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchKey {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EntryMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMetadata {
    pub source_language: String,
}

/// Request document, sent base64-encoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPayload {
    pub keys: IndexMap<String, BatchKey>,
    pub metadata: BatchMetadata,
}

impl BatchPayload {
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| SyncError::InvalidPayload(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| SyncError::InvalidPayload(e.to_string()))
    }
}

impl TranslationBatch {
    pub fn payload(&self, source_language: &str) -> BatchPayload {
        BatchPayload {
            keys: self
                .keys
                .iter()
                .map(|(key, missing)| {
                    (
                        key.clone(),
                        BatchKey {
                            value: missing.value.clone(),
                            context: missing.context.clone(),
                            metadata: missing.metadata.clone(),
                        },
                    )
                })
                .collect(),
            metadata: BatchMetadata {
                source_language: source_language.to_string(),
            },
        }
    }

    /// Base64 of the JSON payload
    pub fn encode(&self, source_language: &str) -> Result<String> {
        let json = serde_json::to_vec(&self.payload(source_language))?;
        Ok(STANDARD.encode(json))
    }
}

/// Group missing keys by source file across locales and split each group
/// into batches of at most `max_batch_size` keys.
///
/// A record whose source file is not in `source_files` is reported as an
/// error; every other group is still batched.
pub fn batch_keys_with_missing(
    source_files: &[TranslationFile],
    missing_by_locale: &IndexMap<String, MissingTranslationRecord>,
    max_batch_size: usize,
) -> BatchResult {
    let max_batch_size = max_batch_size.max(1);
    let mut result = BatchResult::default();

    // source path → (locales, missing keys), in first-seen order
    let mut groups: IndexMap<PathBuf, (BTreeSet<String>, IndexMap<String, MissingKey>)> =
        IndexMap::new();
    for record in missing_by_locale.values() {
        if !source_files.iter().any(|f| f.path == record.source_path) {
            result.errors.push(BatchError::MissingSourceFile {
                path: record.source_path.clone(),
            });
            continue;
        }
        let (locales, keys) = groups.entry(record.source_path.clone()).or_default();
        locales.insert(record.locale.clone());
        for (key, missing) in &record.keys {
            keys.entry(key.clone()).or_insert_with(|| missing.clone());
        }
    }

    for (source_path, (locales, keys)) in groups {
        let ordered = source_order(source_files, &source_path, keys);
        let locales: Vec<String> = locales.into_iter().collect();
        let mut entries = ordered.into_iter().peekable();
        while entries.peek().is_some() {
            let chunk: IndexMap<String, MissingKey> = entries.by_ref().take(max_batch_size).collect();
            result.batches.push(TranslationBatch {
                source_path: source_path.clone(),
                locales: locales.clone(),
                keys: chunk,
            });
        }
    }

    result
}

/// Reorder `keys` to follow the source file, so batches are stable no matter
/// which locale reported a key first
fn source_order(
    source_files: &[TranslationFile],
    source_path: &Path,
    mut keys: IndexMap<String, MissingKey>,
) -> IndexMap<String, MissingKey> {
    let Some(source) = source_files.iter().find(|f| f.path.as_path() == source_path) else {
        return keys;
    };
    let order: IndexSet<&String> = source.keys.keys().collect();
    keys.sort_by(|a, _, b, _| {
        let a = order.get_index_of(a).unwrap_or(usize::MAX);
        let b = order.get_index_of(b).unwrap_or(usize::MAX);
        a.cmp(&b)
    });
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::StructureFormat;
    use crate::parse::{FileFormat, TranslationEntry, TranslationKeys};
    use serde_json::json;
    use std::collections::HashSet;

    fn source_file(path: &str, count: usize) -> TranslationFile {
        TranslationFile {
            path: PathBuf::from(path),
            format: FileFormat::Json,
            locale: "en".to_string(),
            namespace: None,
            has_language_wrapper: false,
            structure: StructureFormat::Flat,
            locale_template: "{locale}.json".to_string(),
            keys: (0..count)
                .map(|i| (format!("key_{}", i), TranslationEntry::new(format!("Value {}", i))))
                .collect::<TranslationKeys>(),
        }
    }

    fn record(locale: &str, source: &TranslationFile, range: std::ops::Range<usize>) -> MissingTranslationRecord {
        MissingTranslationRecord {
            locale: locale.to_string(),
            source_path: source.path.clone(),
            target_path: PathBuf::from(format!("{}.json", locale)),
            target_exists: false,
            keys: range
                .map(|i| {
                    let key = format!("key_{}", i);
                    let missing = MissingKey {
                        value: json!(format!("Value {}", i)),
                        source_key: key.clone(),
                        context: None,
                        metadata: None,
                    };
                    (key, missing)
                })
                .collect(),
        }
    }

    #[test]
    fn test_batches_are_chunked() {
        let source = source_file("en.json", 450);
        let mut missing = IndexMap::new();
        missing.insert("fr:en.json".to_string(), record("fr", &source, 0..450));

        let result = batch_keys_with_missing(&[source], &missing, 200);

        let sizes: Vec<usize> = result.batches.iter().map(|b| b.keys.len()).collect();
        assert_eq!(sizes, vec![200, 200, 50]);
        let unique: HashSet<&String> = result.batches.iter().flat_map(|b| b.keys.keys()).collect();
        assert_eq!(unique.len(), 450);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_locales_share_a_batch_per_source() {
        let source = source_file("en.json", 4);
        let mut missing = IndexMap::new();
        missing.insert("fr:en.json".to_string(), record("fr", &source, 2..4));
        missing.insert("de:en.json".to_string(), record("de", &source, 0..3));

        let result = batch_keys_with_missing(&[source], &missing, DEFAULT_MAX_BATCH_SIZE);

        assert_eq!(result.batches.len(), 1);
        let batch = &result.batches[0];
        assert_eq!(batch.locales, vec!["de".to_string(), "fr".to_string()]);
        let keys: Vec<&String> = batch.keys.keys().collect();
        assert_eq!(keys, vec!["key_0", "key_1", "key_2", "key_3"]);
    }

    #[test]
    fn test_missing_source_file_is_reported() {
        let known = source_file("en.json", 2);
        let unknown = source_file("admin.en.json", 2);
        let mut missing = IndexMap::new();
        missing.insert("fr:admin".to_string(), record("fr", &unknown, 0..2));
        missing.insert("fr:en".to_string(), record("fr", &known, 0..2));

        let result = batch_keys_with_missing(&[known], &missing, 200);

        assert_eq!(result.batches.len(), 1);
        assert_eq!(
            result.errors,
            vec![BatchError::MissingSourceFile {
                path: PathBuf::from("admin.en.json")
            }]
        );
        assert_eq!(
            serde_json::to_value(&result.errors[0]).unwrap(),
            json!({"type": "missing_source_file", "path": "admin.en.json"})
        );
    }

    #[test]
    fn test_encode_payload() {
        let source = source_file("en.json", 1);
        let mut missing = IndexMap::new();
        missing.insert("fr:en.json".to_string(), record("fr", &source, 0..1));
        let result = batch_keys_with_missing(&[source], &missing, 200);

        let encoded = result.batches[0].encode("en").unwrap();
        let decoded = BatchPayload::decode(&encoded).unwrap();
        assert_eq!(decoded.metadata.source_language, "en");
        assert_eq!(decoded.keys["key_0"].value, json!("Value 0"));
        assert!(BatchPayload::decode("not base64!").is_err());
    }
}
