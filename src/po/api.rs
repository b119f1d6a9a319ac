use crate::parse::{EntryMetadata, TranslationEntry, TranslationKeys};

use super::keys::{create_unique_key, plural_key};
use super::parser::PoEntry;

/// Source and current language of the catalog being converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoLanguages {
    pub source_language: String,
    pub current_language: String,
}

impl PoLanguages {
    pub fn new(source_language: impl Into<String>, current_language: impl Into<String>) -> Self {
        Self {
            source_language: source_language.into(),
            current_language: current_language.into(),
        }
    }

    fn is_source(&self) -> bool {
        self.source_language == self.current_language
    }
}

/// Convert parsed entries to API-facing keys.
///
/// A plural entry becomes two linked records: the base key (`plural_index`
/// 0, carrying `msgid_plural`) and `<key>__plural_1` (`plural_index` 1,
/// carrying the base `msgid`). Forms beyond the first plural are not
/// addressed here; the surgical editor handles them on disk.
pub fn po_entries_to_api_format(
    entries: &[PoEntry],
    languages: Option<&PoLanguages>,
) -> TranslationKeys {
    let is_source = languages.map(PoLanguages::is_source).unwrap_or(false);
    let mut keys = TranslationKeys::new();

    for entry in entries.iter().filter(|e| !e.is_header()) {
        let key = create_unique_key(&entry.msgid, entry.msgctxt.as_deref());
        let translator_comments = translator_comments(entry);
        let display = |index: usize, fallback: &str| {
            let stored = entry.msgstr.get(index).map(String::as_str).unwrap_or("");
            if stored.is_empty() && is_source {
                fallback.to_string()
            } else {
                stored.to_string()
            }
        };

        match &entry.msgid_plural {
            None => {
                let mut record = TranslationEntry::new(display(0, &entry.msgid))
                    .with_context(entry.msgctxt.clone());
                if translator_comments.is_some() {
                    record = record.with_metadata(EntryMetadata {
                        translator_comments: translator_comments.clone(),
                        ..Default::default()
                    });
                }
                keys.insert(key, record);
            }
            Some(msgid_plural) => {
                let base = TranslationEntry::new(display(0, &entry.msgid))
                    .with_context(entry.msgctxt.clone())
                    .with_metadata(EntryMetadata {
                        po_plural: Some(true),
                        plural_index: Some(0),
                        msgid_plural: Some(msgid_plural.clone()),
                        translator_comments: translator_comments.clone(),
                        ..Default::default()
                    });
                let plural = TranslationEntry::new(display(1, msgid_plural))
                    .with_context(entry.msgctxt.clone())
                    .with_metadata(EntryMetadata {
                        po_plural: Some(true),
                        plural_index: Some(1),
                        msgid: Some(entry.msgid.clone()),
                        translator_comments,
                        ..Default::default()
                    });
                let companion = plural_key(&key, 1);
                keys.insert(key, base);
                keys.insert(companion, plural);
            }
        }
    }
    keys
}

fn translator_comments(entry: &PoEntry) -> Option<String> {
    if entry.comments.extracted.is_empty() {
        return None;
    }
    let joined = entry.comments.extracted.join("\n");
    let stripped = joined.strip_prefix("Translators: ").unwrap_or(&joined);
    Some(stripped.to_string())
}
