//! Text-level editing of gettext catalogs.
//!
//! Only the lines of fields whose value changes are rewritten; every other
//! byte of the original is copied through, including comments, obsolete
//! entries and line endings.

use crate::error::Result;
use crate::logger::Logger;
use crate::parse::{TranslationPayload, TranslationRecord};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use super::format::{choose_style, render_field, DEFAULT_WRAP_WIDTH};
use super::keys::{parse_unique_key, split_plural_suffix};
use super::parser::{parse_header_block, parse_po_file, plural_count_from_header, PoEntry, PoFile};
use super::scan::{scan_entries, split_lines, FieldKind, FieldSpan, ScannedEntry};

/// Plural slots assumed when the catalog has no `Plural-Forms` header
const DEFAULT_PLURAL_COUNT: usize = 2;

/// Options for [`surgical_update_po_file`]
#[derive(Debug, Clone)]
pub struct SurgicalOptions {
    /// Source-language catalog (usually the `.pot`), used to look up
    /// `msgid_plural` and comments for entries that have to be created
    pub source_content: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    /// New key → old key
    pub key_mappings: IndexMap<String, String>,
    pub wrap_width: usize,
}

impl Default for SurgicalOptions {
    fn default() -> Self {
        Self {
            source_content: None,
            source_language: None,
            target_language: None,
            key_mappings: IndexMap::new(),
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }
}

impl SurgicalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_content(mut self, content: impl Into<String>) -> Self {
        self.source_content = Some(content.into());
        self
    }

    pub fn with_languages(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source_language = Some(source.into());
        self.target_language = Some(target.into());
        self
    }

    pub fn with_key_mapping(mut self, new_key: impl Into<String>, old_key: impl Into<String>) -> Self {
        self.key_mappings.insert(new_key.into(), old_key.into());
        self
    }

    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    fn same_language(&self) -> bool {
        match (&self.source_language, &self.target_language) {
            (Some(source), Some(target)) => source == target,
            _ => false,
        }
    }
}

/// (msgctxt, msgid)
type Identity = (Option<String>, String);

/// Pending changes to one existing entry
#[derive(Debug, Default)]
struct EntryChange {
    /// `Some(None)` removes the context
    msgctxt: Option<Option<String>>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    msgstr: BTreeMap<usize, String>,
}

impl EntryChange {
    fn is_empty(&self) -> bool {
        self.msgctxt.is_none()
            && self.msgid.is_none()
            && self.msgid_plural.is_none()
            && self.msgstr.is_empty()
    }
}

/// An entry to append at the end of the catalog
#[derive(Debug)]
struct NewEntry {
    msgctxt: Option<String>,
    msgid: String,
    msgstr: BTreeMap<usize, String>,
}

/// Replace lines `start..end` with `text`; `start == end` inserts
#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

/// Layout facts of the catalog being edited
struct Layout<'a> {
    eol: &'a str,
    plural_count: usize,
    file_wraps: bool,
    width: usize,
}

impl Layout<'_> {
    fn render(&self, keyword: &str, value: &str, was_multiline: bool) -> String {
        let style = choose_style(keyword, value, was_multiline, self.file_wraps, self.width);
        render_field(keyword, value, style, self.width, self.eol)
    }
}

/// Apply translations to PO text, touching only what changes.
///
/// Keys are `msgid` or `context|msgid`, with `__plural_N` addressing
/// `msgstr[N]`. Renames come from `options.key_mappings` or from a record's
/// first `old_values` entry. Returns `original` unchanged when nothing
/// differs. A target that cannot be scanned is an error; a broken
/// `source_content` only degrades new plural entries.
pub fn surgical_update_po_file(
    original: &str,
    translations: &TranslationPayload,
    options: &SurgicalOptions,
    logger: &dyn Logger,
) -> Result<String> {
    if translations.is_empty() {
        return Ok(original.to_string());
    }

    let lines = split_lines(original);
    let scanned = scan_entries(&lines)?;
    let layout = Layout {
        eol: if original.contains("\r\n") { "\r\n" } else { "\n" },
        plural_count: header_plural_count(&scanned).unwrap_or(DEFAULT_PLURAL_COUNT),
        file_wraps: scanned
            .iter()
            .filter(|e| !e.is_header())
            .any(|e| e.fields.iter().any(|f| f.multiline)),
        width: options.wrap_width,
    };
    let source = parse_source(options, logger);

    let mut editor = Editor {
        scanned: &scanned,
        index: scanned
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_header())
            .map(|(i, e)| (identity_of(e), i))
            .collect(),
        changes: scanned.iter().map(|_| EntryChange::default()).collect(),
        created: IndexMap::new(),
        source: source.as_ref(),
        options,
        logger,
    };

    for record in translations.records() {
        editor.apply(&record);
    }

    let mut edits = Vec::new();
    for (entry, change) in scanned.iter().zip(&editor.changes) {
        if !change.is_empty() {
            edits.extend(entry_edits(entry, change, &layout));
        }
    }
    if let Some(appended) = editor.render_created(&layout, &lines) {
        edits.push(appended);
    }

    if edits.is_empty() {
        return Ok(original.to_string());
    }
    Ok(splice(&lines, edits, layout.eol, original.ends_with('\n')))
}

struct Editor<'a> {
    scanned: &'a [ScannedEntry],
    index: HashMap<Identity, usize>,
    changes: Vec<EntryChange>,
    created: IndexMap<String, NewEntry>,
    source: Option<&'a PoFile>,
    options: &'a SurgicalOptions,
    logger: &'a dyn Logger,
}

impl Editor<'_> {
    fn apply(&mut self, record: &TranslationRecord) {
        let Some(value) = value_text(&record.value) else {
            if !record.value.is_null() {
                self.logger
                    .warn(&format!("Skipping '{}': PO values must be strings", record.key));
            }
            return;
        };

        let (base, plural_index) = split_plural_suffix(&record.key);
        let identity = self.resolve(base);

        let options = self.options;
        let old_key = options
            .key_mappings
            .get(&record.key)
            .or_else(|| options.key_mappings.get(base))
            .map(String::as_str)
            .or_else(|| record.old_key());
        if let Some(old_key) = old_key {
            self.rename(old_key, &identity);
        }

        match self.index.get(&identity).copied() {
            Some(position) => self.update_slot(position, &record.key, plural_index, value),
            None => {
                self.created
                    .entry(base.to_string())
                    .or_insert_with(|| NewEntry {
                        msgctxt: identity.0.clone(),
                        msgid: identity.1.clone(),
                        msgstr: BTreeMap::new(),
                    })
                    .msgstr
                    .insert(plural_index, value);
            }
        }
    }

    /// Identity addressed by `key`. A `|` normally separates the context,
    /// but a context-less msgid that contains one keeps its literal key.
    fn resolve(&self, key: &str) -> Identity {
        let unique = parse_unique_key(key);
        let identity: Identity = (unique.context, unique.msgid);
        if identity.0.is_some() && !self.index.contains_key(&identity) {
            let literal: Identity = (None, key.to_string());
            if self.index.contains_key(&literal) {
                return literal;
            }
        }
        identity
    }

    /// Move the entry found under `old_key` to `identity`
    fn rename(&mut self, old_key: &str, identity: &Identity) {
        let old_identity = self.resolve(split_plural_suffix(old_key).0);
        if &old_identity == identity {
            return;
        }
        let Some(position) = self.index.get(&old_identity).copied() else {
            return;
        };
        if self.index.contains_key(identity) {
            self.logger.warn(&format!(
                "Not renaming '{}': an entry for the new key already exists",
                old_key
            ));
            return;
        }

        let entry = &self.scanned[position];
        let change = &mut self.changes[position];
        if entry.msgctxt().map(str::to_string) != identity.0 {
            change.msgctxt = Some(identity.0.clone());
        }
        change.msgid = Some(identity.1.clone());
        if entry.msgid_plural().is_some() {
            let plural = self
                .source
                .and_then(|s| s.find(identity.0.as_deref(), &identity.1))
                .and_then(|e| e.msgid_plural.clone());
            if let Some(plural) = plural {
                if entry.msgid_plural() != Some(plural.as_str()) {
                    change.msgid_plural = Some(plural);
                }
            }
        }

        self.index.remove(&old_identity);
        self.index.insert(identity.clone(), position);
    }

    fn update_slot(&mut self, position: usize, key: &str, plural_index: usize, value: String) {
        let entry = &self.scanned[position];
        if plural_index > 0 && !entry.is_plural() {
            self.logger.warn(&format!(
                "Skipping '{}': the entry has no plural forms",
                key
            ));
            return;
        }

        let change = &mut self.changes[position];
        let current = change
            .msgstr
            .get(&plural_index)
            .cloned()
            .or_else(|| entry.msgstr_slot(plural_index).map(|f| f.value.clone()));
        if current.as_deref() != Some(value.as_str()) {
            change.msgstr.insert(plural_index, value);
        }
    }

    /// One edit appending every created entry, separated by blank lines
    fn render_created(&self, layout: &Layout, lines: &[&str]) -> Option<Edit> {
        let mut blocks = Vec::new();
        for new_entry in self.created.values() {
            if let Some(block) = self.render_new_entry(new_entry, layout) {
                blocks.push(block);
            }
        }
        if blocks.is_empty() {
            return None;
        }

        let ends_with_blank = lines.last().map(|l| l.trim().is_empty()).unwrap_or(true);
        let mut text = String::new();
        if !ends_with_blank {
            text.push_str(layout.eol);
        }
        text.push_str(&blocks.join(layout.eol));
        Some(Edit {
            start: lines.len(),
            end: lines.len(),
            text,
        })
    }

    fn render_new_entry(&self, new_entry: &NewEntry, layout: &Layout) -> Option<String> {
        let base_value = new_entry.msgstr.get(&0);
        if self.options.same_language() && base_value == Some(&new_entry.msgid) {
            self.logger.log(&format!(
                "Skipping '{}': identical to its msgid in the source language",
                new_entry.msgid
            ));
            return None;
        }

        let source_entry: Option<&PoEntry> = self
            .source
            .and_then(|s| s.find(new_entry.msgctxt.as_deref(), &new_entry.msgid));
        let max_index = new_entry.msgstr.keys().next_back().copied().unwrap_or(0);
        let msgid_plural = match source_entry.and_then(|e| e.msgid_plural.clone()) {
            Some(plural) => Some(plural),
            None if max_index > 0 => {
                let fallback = new_entry
                    .msgstr
                    .range(1..)
                    .next()
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default();
                self.logger.warn(&format!(
                    "No msgid_plural known for '{}'; using the translated plural '{}' instead",
                    new_entry.msgid, fallback
                ));
                Some(fallback)
            }
            None => None,
        };

        let mut text = String::new();
        if let Some(source_entry) = source_entry {
            for comment in &source_entry.comments.extracted {
                text.push_str(&format!("#. {}{}", comment, layout.eol));
            }
            for reference in &source_entry.comments.references {
                text.push_str(&format!("#: {}{}", reference, layout.eol));
            }
        }
        if let Some(context) = &new_entry.msgctxt {
            text.push_str(&layout.render("msgctxt", context, false));
        }
        text.push_str(&layout.render("msgid", &new_entry.msgid, false));

        match &msgid_plural {
            Some(plural) => {
                text.push_str(&layout.render("msgid_plural", plural, false));
                let slots = layout.plural_count.max(max_index + 1);
                for index in 0..slots {
                    let value = new_entry.msgstr.get(&index).map(String::as_str).unwrap_or("");
                    let keyword = FieldKind::Msgstr(Some(index)).keyword();
                    text.push_str(&layout.render(&keyword, value, false));
                }
            }
            None => {
                let value = base_value.map(String::as_str).unwrap_or("");
                text.push_str(&layout.render("msgstr", value, false));
            }
        }
        Some(text)
    }
}

fn identity_of(entry: &ScannedEntry) -> Identity {
    (
        entry.msgctxt().map(str::to_string),
        entry.msgid().unwrap_or_default().to_string(),
    )
}

fn header_plural_count(scanned: &[ScannedEntry]) -> Option<usize> {
    let header = scanned.iter().find(|e| e.is_header())?;
    let headers = parse_header_block(&header.msgstr_slot(0)?.value);
    plural_count_from_header(headers.get("Plural-Forms")?)
}

fn parse_source(options: &SurgicalOptions, logger: &dyn Logger) -> Option<PoFile> {
    let content = options.source_content.as_deref()?;
    match parse_po_file(content) {
        Ok(po_file) => Some(po_file),
        Err(e) => {
            logger.warn(&format!(
                "Could not parse source catalog, plural forms of new entries may be guessed: {}",
                e
            ));
            None
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        _ => None,
    }
}

/// Edits for one existing entry
fn entry_edits(entry: &ScannedEntry, change: &EntryChange, layout: &Layout) -> Vec<Edit> {
    let mut edits = Vec::new();
    let msgid = entry.field(FieldKind::Msgid);

    if let Some(context) = &change.msgctxt {
        match (entry.field(FieldKind::Msgctxt), context) {
            (Some(field), Some(context)) => edits.push(replace(field, context, layout)),
            (Some(field), None) => edits.push(Edit {
                start: field.start,
                end: field.end,
                text: String::new(),
            }),
            (None, Some(context)) => {
                let at = msgid.map(|f| f.start).unwrap_or(entry.first_line);
                edits.push(Edit {
                    start: at,
                    end: at,
                    text: layout.render("msgctxt", context, false),
                });
            }
            (None, None) => {}
        }
    }

    if let (Some(new_msgid), Some(field)) = (&change.msgid, msgid) {
        edits.push(replace(field, new_msgid, layout));
    }

    if let Some(plural) = &change.msgid_plural {
        if let Some(field) = entry.field(FieldKind::MsgidPlural) {
            edits.push(replace(field, plural, layout));
        }
    }

    let after_last_msgstr = entry.msgstrs().map(|f| f.end).max();
    for (index, value) in &change.msgstr {
        match entry.msgstr_slot(*index) {
            Some(field) => edits.push(replace(field, value, layout)),
            None => {
                let at = after_last_msgstr.unwrap_or(entry.first_line);
                let keyword = FieldKind::Msgstr(Some(*index)).keyword();
                edits.push(Edit {
                    start: at,
                    end: at,
                    text: layout.render(&keyword, value, false),
                });
            }
        }
    }
    edits
}

fn replace(field: &FieldSpan, value: &str, layout: &Layout) -> Edit {
    Edit {
        start: field.start,
        end: field.end,
        text: layout.render(&field.kind.keyword(), value, field.multiline),
    }
}

/// Rebuild the text: untouched lines verbatim, edits in place
fn splice(lines: &[&str], mut edits: Vec<Edit>, eol: &str, had_final_newline: bool) -> String {
    edits.sort_by_key(|e| (e.start, e.end));

    let mut out = String::new();
    let mut cursor = 0;
    for edit in &edits {
        for line in &lines[cursor..edit.start.max(cursor)] {
            out.push_str(line);
        }
        if !edit.text.is_empty() && !out.is_empty() && !out.ends_with('\n') {
            out.push_str(eol);
        }
        out.push_str(&edit.text);
        cursor = cursor.max(edit.end);
    }

    let tail_edited = cursor >= lines.len();
    for line in &lines[cursor.min(lines.len())..] {
        out.push_str(line);
    }
    if tail_edited && !had_final_newline && !lines.is_empty() {
        let trimmed = out.trim_end_matches(['\n', '\r']).len();
        out.truncate(trimmed);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{MemoryLogger, SilentLogger};

    const PLURAL_FILE: &str = "msgid \"\"\nmsgstr \"\"\n\"Language: sv\\n\"\n\"Plural-Forms: nplurals=2; plural=(n != 1);\\n\"\n\n# keep me\nmsgid \"item\"\nmsgid_plural \"items\"\nmsgstr[0] \"objekt\"\nmsgstr[1] \"\"\n";

    fn update(original: &str, payload: TranslationPayload) -> String {
        surgical_update_po_file(original, &payload, &SurgicalOptions::default(), &SilentLogger)
            .unwrap()
    }

    #[test]
    fn test_updates_single_plural_slot() {
        let result = update(PLURAL_FILE, [("item__plural_1", "objekts")].into());
        assert!(result.contains("msgstr[1] \"objekts\"\n"));
        assert!(result.contains("msgstr[0] \"objekt\"\n"));
        assert_eq!(result, PLURAL_FILE.replace("msgstr[1] \"\"", "msgstr[1] \"objekts\""));
    }

    #[test]
    fn test_empty_translations_return_input() {
        let payload = TranslationPayload::default();
        let result =
            surgical_update_po_file(PLURAL_FILE, &payload, &SurgicalOptions::default(), &SilentLogger)
                .unwrap();
        assert_eq!(result, PLURAL_FILE);
    }

    #[test]
    fn test_unchanged_values_keep_bytes() {
        let text = "msgid \"a\"\r\nmsgstr \"A\"\r\n\r\nmsgid \"b\"\r\nmsgstr \"B\"";
        assert_eq!(update(text, [("a", "A"), ("b", "B")].into()), text);
    }

    #[test]
    fn test_rename_with_key_mapping() {
        let text = "msgid \"Redigera objekt\"\nmsgstr \"Edit item\"\n";
        let options = SurgicalOptions::new().with_key_mapping("Ändra objekt", "Redigera objekt");
        let result = surgical_update_po_file(
            text,
            &[("Ändra objekt", "Modify item")].into(),
            &options,
            &SilentLogger,
        )
        .unwrap();
        assert!(result.contains("msgid \"Ändra objekt\""));
        assert!(result.contains("msgstr \"Modify item\""));
        assert!(!result.contains("Redigera objekt"));
    }

    #[test]
    fn test_rename_from_old_values_changes_context() {
        let text = "msgctxt \"old\"\nmsgid \"Save\"\nmsgstr \"Spara\"\n";
        let payload = TranslationPayload::Records(vec![
            TranslationRecord::new("Save", "Spara").with_old_key("old|Save"),
        ]);
        let result =
            surgical_update_po_file(text, &payload, &SurgicalOptions::default(), &SilentLogger)
                .unwrap();
        assert_eq!(result, "msgid \"Save\"\nmsgstr \"Spara\"\n");
    }

    #[test]
    fn test_rename_of_unknown_old_key_creates_entry() {
        let text = "msgid \"a\"\nmsgstr \"A\"\n";
        let options = SurgicalOptions::new().with_key_mapping("b", "missing");
        let result =
            surgical_update_po_file(text, &[("b", "B")].into(), &options, &SilentLogger).unwrap();
        assert_eq!(result, "msgid \"a\"\nmsgstr \"A\"\n\nmsgid \"b\"\nmsgstr \"B\"\n");
    }

    #[test]
    fn test_comment_between_fields_is_kept() {
        let text = "msgid \"one\"\n# translator note\nmsgstr \"uno\"\n";
        let result = update(text, [("one", "ett")].into());
        assert_eq!(result, "msgid \"one\"\n# translator note\nmsgstr \"ett\"\n");
    }

    #[test]
    fn test_multiline_field_is_rewrapped() {
        let text = "msgid \"long\"\nmsgstr \"\"\n\"first part \"\n\"second part\"\n\nmsgid \"next\"\nmsgstr \"x\"\n";
        let value = "a brand new value that is long enough to need wrapping at thirty columns";
        let options = SurgicalOptions::new().with_wrap_width(30);
        let result =
            surgical_update_po_file(text, &[("long", value)].into(), &options, &SilentLogger)
                .unwrap();

        assert!(result.starts_with("msgid \"long\"\nmsgstr \"\"\n\""));
        assert!(result.ends_with("\nmsgid \"next\"\nmsgstr \"x\"\n"));
        let reparsed = parse_po_file(&result).unwrap();
        assert_eq!(reparsed.find(None, "long").unwrap().msgstr[0], value);
        for line in result.lines() {
            assert!(line.chars().count() <= 30 || line.starts_with("msgid"));
        }
    }

    #[test]
    fn test_inner_newline_goes_multiline() {
        let result = update("msgid \"a\"\nmsgstr \"\"\n", [("a", "one\ntwo")].into());
        assert_eq!(result, "msgid \"a\"\nmsgstr \"\"\n\"one\\n\"\n\"two\"\n");
    }

    #[test]
    fn test_escaping_of_quotes() {
        let result = update("msgid \"q\"\nmsgstr \"\"\n", [("q", "Say \"hi\"")].into());
        assert_eq!(result, "msgid \"q\"\nmsgstr \"Say \\\"hi\\\"\"\n");
    }

    #[test]
    fn test_new_plural_entry_from_source() {
        let target = "msgid \"\"\nmsgstr \"\"\n\"Plural-Forms: nplurals=3; plural=(n==1 ? 0 : 1);\\n\"\n\nmsgid \"a\"\nmsgstr \"A\"\n";
        let source = "#. Number of files\n#: src/files.rs:3\nmsgctxt \"files\"\nmsgid \"file\"\nmsgid_plural \"files\"\nmsgstr[0] \"\"\nmsgstr[1] \"\"\n";
        let options = SurgicalOptions::new().with_source_content(source);
        let payload: TranslationPayload =
            [("files|file", "plik"), ("files|file__plural_1", "pliki")].into();
        let result = surgical_update_po_file(target, &payload, &options, &SilentLogger).unwrap();

        let expected_tail = "msgstr \"A\"\n\n#. Number of files\n#: src/files.rs:3\nmsgctxt \"files\"\nmsgid \"file\"\nmsgid_plural \"files\"\nmsgstr[0] \"plik\"\nmsgstr[1] \"pliki\"\nmsgstr[2] \"\"\n";
        assert!(result.ends_with(expected_tail), "{}", result);
        assert!(result.starts_with(target));
    }

    #[test]
    fn test_new_plural_entry_without_source_warns() {
        let logger = MemoryLogger::new();
        let payload: TranslationPayload = [("day", "dag"), ("day__plural_1", "dagar")].into();
        let result =
            surgical_update_po_file("", &payload, &SurgicalOptions::default(), &logger).unwrap();
        assert_eq!(
            result,
            "msgid \"day\"\nmsgid_plural \"dagar\"\nmsgstr[0] \"dag\"\nmsgstr[1] \"dagar\"\n"
        );
        assert_eq!(logger.warnings().len(), 1);
    }

    #[test]
    fn test_malformed_source_is_a_warning() {
        let logger = MemoryLogger::new();
        let options = SurgicalOptions::new().with_source_content("msgid \"broken");
        let result = surgical_update_po_file(
            "msgid \"a\"\nmsgstr \"\"\n",
            &[("a", "A")].into(),
            &options,
            &logger,
        )
        .unwrap();
        assert_eq!(result, "msgid \"a\"\nmsgstr \"A\"\n");
        assert!(logger.warnings()[0].contains("source catalog"));
    }

    #[test]
    fn test_unparsable_target_is_an_error() {
        let result = surgical_update_po_file(
            "msgid \"a\nmsgstr \"\"\n",
            &[("a", "A")].into(),
            &SurgicalOptions::default(),
            &SilentLogger,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_same_language_identity_is_not_created() {
        let options = SurgicalOptions::new().with_languages("en", "en");
        let result = surgical_update_po_file(
            "msgid \"a\"\nmsgstr \"a\"\n",
            &[("Hello", "Hello")].into(),
            &options,
            &SilentLogger,
        )
        .unwrap();
        assert_eq!(result, "msgid \"a\"\nmsgstr \"a\"\n");
    }

    #[test]
    fn test_missing_plural_slot_is_inserted() {
        let text = "msgid \"\"\nmsgstr \"\"\n\"Plural-Forms: nplurals=3;\\n\"\n\nmsgid \"x\"\nmsgid_plural \"xs\"\nmsgstr[0] \"a\"\nmsgstr[1] \"b\"\n\nmsgid \"y\"\nmsgstr \"Y\"\n";
        let result = update(text, [("x__plural_2", "c")].into());
        assert!(result.contains("msgstr[1] \"b\"\nmsgstr[2] \"c\"\n\nmsgid \"y\""));
    }

    #[test]
    fn test_plural_index_on_singular_entry_warns() {
        let logger = MemoryLogger::new();
        let text = "msgid \"a\"\nmsgstr \"A\"\n";
        let result = surgical_update_po_file(
            text,
            &[("a__plural_1", "As")].into(),
            &SurgicalOptions::default(),
            &logger,
        )
        .unwrap();
        assert_eq!(result, text);
        assert_eq!(logger.warnings().len(), 1);
    }

    #[test]
    fn test_missing_final_newline_is_preserved() {
        let text = "msgid \"a\"\nmsgstr \"A\"";
        assert_eq!(update(text, [("a", "B")].into()), "msgid \"a\"\nmsgstr \"B\"");
        assert_eq!(
            update(text, [("b", "B")].into()),
            "msgid \"a\"\nmsgstr \"A\"\n\nmsgid \"b\"\nmsgstr \"B\""
        );
    }

    #[test]
    fn test_msgid_with_pipe_is_updated_in_place() {
        let text = "msgid \"Home | Site\"\nmsgstr \"\"\n";
        assert_eq!(
            update(text, [("Home | Site", "Hem | Sajt")].into()),
            "msgid \"Home | Site\"\nmsgstr \"Hem | Sajt\"\n"
        );

        let with_context = "msgctxt \"Home \"\nmsgid \" Site\"\nmsgstr \"\"\n";
        assert_eq!(
            update(with_context, [("Home | Site", "Hem")].into()),
            "msgctxt \"Home \"\nmsgid \" Site\"\nmsgstr \"Hem\"\n"
        );
    }

    #[test]
    fn test_rename_from_msgid_with_pipe() {
        let text = "msgid \"Home | Site\"\nmsgstr \"Hem\"\n";
        let options = SurgicalOptions::new().with_key_mapping("Start", "Home | Site");
        let result =
            surgical_update_po_file(text, &[("Start", "Start")].into(), &options, &SilentLogger)
                .unwrap();
        assert_eq!(result, "msgid \"Start\"\nmsgstr \"Start\"\n");
    }

    #[test]
    fn test_update_is_idempotent() {
        let payload: TranslationPayload =
            [("item", "sak"), ("item__plural_1", "saker"), ("new", "ny")].into();
        let once = update(PLURAL_FILE, payload.clone());
        let twice = update(&once, payload);
        assert_eq!(once, twice);
        assert!(once.contains("# keep me\n"));
    }
}
