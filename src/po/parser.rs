//! gettext catalog model.
//!
//! Comment prefixes follow the PO format:
//! - `#  ` translator comments
//! - `#. ` extracted comments
//! - `#: ` references (file:line)
//! - `#, ` flags (fuzzy, c-format, ...)
//! - `#| ` previous msgid
//! - `#~ ` obsolete entries

use crate::error::Result;
use crate::logger::Logger;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::keys::create_unique_key;
use super::scan::{scan_entries, split_lines, strip_eol, FieldKind, ScannedEntry};

static NPLURALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"nplurals\s*=\s*(\d+)").expect("nplurals pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoComments {
    pub translator: Vec<String>,
    pub extracted: Vec<String>,
    pub references: Vec<String>,
    pub flags: Vec<String>,
    pub previous: Vec<String>,
}

impl PoComments {
    fn from_lines(lines: &[String]) -> Self {
        let mut comments = Self::default();
        for line in lines {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("#.") {
                comments.extracted.push(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("#:") {
                comments.references.push(rest.trim().to_string());
            } else if let Some(rest) = line.strip_prefix("#,") {
                comments
                    .flags
                    .extend(rest.split(',').map(|f| f.trim().to_string()).filter(|f| !f.is_empty()));
            } else if let Some(rest) = line.strip_prefix("#|") {
                comments.previous.push(rest.trim().to_string());
            } else if line.starts_with("#~") {
                continue;
            } else if let Some(rest) = line.strip_prefix('#') {
                comments.translator.push(rest.trim().to_string());
            }
        }
        comments
    }

    pub fn is_empty(&self) -> bool {
        self.translator.is_empty()
            && self.extracted.is_empty()
            && self.references.is_empty()
            && self.flags.is_empty()
            && self.previous.is_empty()
    }
}

/// A single message entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoEntry {
    pub msgid: String,
    pub msgid_plural: Option<String>,
    pub msgctxt: Option<String>,
    /// One element for singular entries, one per plural form otherwise
    pub msgstr: Vec<String>,
    pub comments: PoComments,
}

impl PoEntry {
    /// The header entry has an empty msgid and no context
    pub fn is_header(&self) -> bool {
        self.msgid.is_empty() && self.msgctxt.is_none()
    }

    pub fn is_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }

    pub fn is_fuzzy(&self) -> bool {
        self.comments.flags.iter().any(|f| f == "fuzzy")
    }

    /// `context|msgid`, or the bare msgid
    pub fn unique_key(&self) -> String {
        create_unique_key(&self.msgid, self.msgctxt.as_deref())
    }

    fn from_scanned(scanned: &ScannedEntry) -> Self {
        let mut msgstr: Vec<String> = Vec::new();
        for field in scanned.msgstrs() {
            let index = match field.kind {
                FieldKind::Msgstr(Some(index)) => index,
                _ => 0,
            };
            if msgstr.len() <= index {
                msgstr.resize(index + 1, String::new());
            }
            msgstr[index] = field.value.clone();
        }

        Self {
            msgid: scanned.msgid().unwrap_or_default().to_string(),
            msgid_plural: scanned.msgid_plural().map(str::to_string),
            msgctxt: scanned.msgctxt().map(str::to_string),
            msgstr,
            comments: PoComments::from_lines(&scanned.comments),
        }
    }
}

/// Parsed catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoFile {
    /// `Name: value` pairs of the header entry, in order
    pub headers: IndexMap<String, String>,
    pub header_comments: PoComments,
    /// Message entries, header excluded
    pub entries: Vec<PoEntry>,
    /// Obsolete `#~` lines, verbatim
    pub obsolete: Vec<String>,
}

impl PoFile {
    /// `nplurals` from the `Plural-Forms` header
    pub fn plural_count(&self) -> Option<usize> {
        self.headers
            .get("Plural-Forms")
            .and_then(|forms| plural_count_from_header(forms))
    }

    pub fn find(&self, context: Option<&str>, msgid: &str) -> Option<&PoEntry> {
        self.entries
            .iter()
            .find(|e| e.msgid == msgid && e.msgctxt.as_deref() == context)
    }
}

pub fn plural_count_from_header(plural_forms: &str) -> Option<usize> {
    NPLURALS
        .captures(plural_forms)
        .and_then(|caps| caps[1].parse().ok())
}

/// Split a header msgstr into `Name: value` pairs
pub fn parse_header_block(msgstr: &str) -> IndexMap<String, String> {
    msgstr
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Parse catalog text. Any syntax error is returned with its line number.
pub fn parse_po_file(text: &str) -> Result<PoFile> {
    let lines = split_lines(text);
    let scanned = scan_entries(&lines)?;

    let mut po_file = PoFile {
        obsolete: lines
            .iter()
            .map(|l| strip_eol(l))
            .filter(|l| l.trim_start().starts_with("#~"))
            .map(str::to_string)
            .collect(),
        ..Default::default()
    };

    for entry in scanned.iter().map(PoEntry::from_scanned) {
        if entry.is_header() && po_file.headers.is_empty() && po_file.entries.is_empty() {
            po_file.headers = parse_header_block(entry.msgstr.first().map(String::as_str).unwrap_or(""));
            po_file.header_comments = entry.comments;
        } else {
            po_file.entries.push(entry);
        }
    }

    Ok(po_file)
}

/// Parse for display purposes: a broken file yields an empty catalog and a
/// warning instead of an error.
pub fn parse_po_file_lenient(text: &str, logger: &dyn Logger) -> PoFile {
    match parse_po_file(text) {
        Ok(po_file) => po_file,
        Err(e) => {
            logger.warn(&format!("Could not parse PO content, showing it as empty: {}", e));
            PoFile::default()
        }
    }
}
