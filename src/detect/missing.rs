use crate::config::SyncConfig;
use crate::locate::{expected_target_path, find_target_file};
use crate::logger::Logger;
use crate::parse::{EntryMetadata, TranslationFile, TranslationKeys};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Source value marking a key that must not be translated
pub const SKIP_TRANSLATION_SENTINEL: &str = "__skip_translation__";

/// A key that needs translating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingKey {
    pub value: Value,
    pub source_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EntryMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipReason {
    Wip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedKey {
    pub key: String,
    pub value: Value,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MissingTranslations {
    pub missing_keys: IndexMap<String, MissingKey>,
    pub skipped_keys: Vec<SkippedKey>,
}

/// Missing keys of one (locale, source file) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingTranslationRecord {
    pub locale: String,
    pub source_path: PathBuf,
    /// The matched target, or where it will be created
    pub target_path: PathBuf,
    pub target_exists: bool,
    pub keys: IndexMap<String, MissingKey>,
}

/// `wip_…`, `…_wip` or the skip sentinel. Only strings can be WIP.
pub fn is_wip_value(value: &Value) -> bool {
    match value {
        Value::String(s) => {
            s.starts_with("wip_") || s.ends_with("_wip") || s == SKIP_TRANSLATION_SENTINEL
        }
        _ => false,
    }
}

/// Keys of `source` that `target` lacks or leaves empty, in source order
pub fn find_missing_translations(
    source: &TranslationKeys,
    target: &TranslationKeys,
) -> MissingTranslations {
    let mut result = MissingTranslations::default();

    for (key, entry) in source {
        let translated = target.get(key).map(|t| !t.is_blank()).unwrap_or(false);
        if translated {
            continue;
        }

        if is_wip_value(&entry.value) {
            result.skipped_keys.push(SkippedKey {
                key: key.clone(),
                value: entry.value.clone(),
                reason: SkipReason::Wip,
            });
            continue;
        }

        result.missing_keys.insert(
            key.clone(),
            MissingKey {
                value: entry.value.clone(),
                source_key: key.clone(),
                context: entry.context.clone(),
                metadata: entry.metadata.clone(),
            },
        );
    }

    result
}

/// Compare every source file against its target in every output locale.
///
/// Results are keyed `"<locale>:<source path>"`; pairs with nothing missing
/// are left out. Locales come from `config.output_locales`, or from
/// `target_files_by_locale` when none are configured.
pub fn find_missing_translations_by_locale(
    source_files: &[TranslationFile],
    target_files_by_locale: &BTreeMap<String, Vec<TranslationFile>>,
    config: &SyncConfig,
    verbose: bool,
    logger: &dyn Logger,
) -> IndexMap<String, MissingTranslationRecord> {
    let locales: Vec<String> = if config.output_locales.is_empty() {
        target_files_by_locale.keys().cloned().collect()
    } else {
        config.output_locales.clone()
    };
    let no_targets = Vec::new();
    let empty = TranslationKeys::new();
    let mut records = IndexMap::new();

    for locale in &locales {
        let candidates = target_files_by_locale.get(locale).unwrap_or(&no_targets);

        for source in source_files {
            if source.keys.is_empty() {
                logger.warn(&format!(
                    "Skipping {}: no translatable content",
                    source.path.display()
                ));
                continue;
            }

            let target = find_target_file(source, locale, candidates);
            let target_keys = target.map(|t| &t.keys).unwrap_or(&empty);
            let found = find_missing_translations(&source.keys, target_keys);

            if verbose {
                logger.log(&format!(
                    "{} → {}: {} missing, {} skipped",
                    source.path.display(),
                    locale,
                    found.missing_keys.len(),
                    found.skipped_keys.len()
                ));
            }
            if found.missing_keys.is_empty() {
                continue;
            }

            let record = MissingTranslationRecord {
                locale: locale.clone(),
                source_path: source.path.clone(),
                target_path: target
                    .map(|t| t.path.clone())
                    .unwrap_or_else(|| expected_target_path(source, locale)),
                target_exists: target.is_some(),
                keys: found.missing_keys,
            };
            records.insert(format!("{}:{}", locale, source.path.display()), record);
        }
    }

    records
}
