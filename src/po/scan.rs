//! Line scanner for gettext catalogs.
//!
//! Records, for every entry, which lines each keyword (and its continuation
//! strings) occupies. The model parser builds `PoEntry` values from this;
//! the surgical editor uses the spans to replace exactly the lines of a field.

use crate::error::{Result, SyncError};

use super::format::unescape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Msgctxt,
    Msgid,
    MsgidPlural,
    /// `msgstr` is `None`, `msgstr[N]` is `Some(N)`
    Msgstr(Option<usize>),
}

impl FieldKind {
    pub fn keyword(self) -> String {
        match self {
            Self::Msgctxt => "msgctxt".to_string(),
            Self::Msgid => "msgid".to_string(),
            Self::MsgidPlural => "msgid_plural".to_string(),
            Self::Msgstr(None) => "msgstr".to_string(),
            Self::Msgstr(Some(index)) => format!("msgstr[{}]", index),
        }
    }
}

/// One keyword and its continuation lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpan {
    pub kind: FieldKind,
    /// First line (0-indexed)
    pub start: usize,
    /// One past the last line
    pub end: usize,
    /// Decoded value
    pub value: String,
    /// `keyword ""` followed by continuation strings
    pub multiline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedEntry {
    /// First line of the entry, comments included
    pub first_line: usize,
    /// Comment lines attached to the entry, verbatim
    pub comments: Vec<String>,
    pub fields: Vec<FieldSpan>,
}

impl ScannedEntry {
    pub fn field(&self, kind: FieldKind) -> Option<&FieldSpan> {
        self.fields.iter().find(|f| f.kind == kind)
    }

    pub fn msgid(&self) -> Option<&str> {
        self.field(FieldKind::Msgid).map(|f| f.value.as_str())
    }

    pub fn msgctxt(&self) -> Option<&str> {
        self.field(FieldKind::Msgctxt).map(|f| f.value.as_str())
    }

    pub fn msgid_plural(&self) -> Option<&str> {
        self.field(FieldKind::MsgidPlural).map(|f| f.value.as_str())
    }

    pub fn msgstrs(&self) -> impl Iterator<Item = &FieldSpan> {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Msgstr(_)))
    }

    /// The `msgstr` slot for a plural index; index 0 also matches a bare `msgstr`
    pub fn msgstr_slot(&self, index: usize) -> Option<&FieldSpan> {
        self.msgstrs().find(|f| match f.kind {
            FieldKind::Msgstr(Some(i)) => i == index,
            FieldKind::Msgstr(None) => index == 0,
            _ => false,
        })
    }

    pub fn is_header(&self) -> bool {
        self.msgid() == Some("") && self.msgctxt().is_none()
    }

    /// Uses indexed `msgstr[N]` slots
    pub fn is_plural(&self) -> bool {
        self.msgid_plural().is_some()
            || self
                .msgstrs()
                .any(|f| matches!(f.kind, FieldKind::Msgstr(Some(_))))
    }

    fn has_msgstr(&self) -> bool {
        self.msgstrs().next().is_some()
    }
}

/// Split text into lines that keep their line endings
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

pub fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Scan all entries. Obsolete (`#~`) lines are treated as comments.
pub fn scan_entries(lines: &[&str]) -> Result<Vec<ScannedEntry>> {
    let mut scanner = Scanner::default();
    for (index, raw) in lines.iter().enumerate() {
        scanner.feed(index, strip_eol(raw))?;
    }
    scanner.finish()
}

#[derive(Default)]
struct Scanner {
    entries: Vec<ScannedEntry>,
    current: Option<ScannedEntry>,
    pending_comments: Vec<String>,
    pending_first_line: Option<usize>,
    /// Index into `current.fields` that continuation strings extend
    open_field: Option<usize>,
}

impl Scanner {
    fn feed(&mut self, index: usize, line: &str) -> Result<()> {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if self.current.as_ref().map(ScannedEntry::has_msgstr).unwrap_or(false) {
                self.flush(index)?;
            }
            self.open_field = None;
            return Ok(());
        }

        if trimmed.starts_with('#') {
            self.open_field = None;
            // Comments between msgid and msgstr stay with their entry
            let inside_entry = self
                .current
                .as_ref()
                .map(|e| !e.has_msgstr())
                .unwrap_or(false);
            if inside_entry {
                if let Some(entry) = self.current.as_mut() {
                    entry.comments.push(line.to_string());
                }
            } else {
                if self.current.is_some() {
                    self.flush(index)?;
                }
                self.pending_first_line.get_or_insert(index);
                self.pending_comments.push(line.to_string());
            }
            return Ok(());
        }

        if trimmed.starts_with('"') {
            let value = parse_quoted(trimmed, index + 1)?;
            let (Some(entry), Some(field_index)) = (self.current.as_mut(), self.open_field) else {
                return Err(SyncError::po_parse(
                    index + 1,
                    "continuation string without a keyword",
                ));
            };
            let field = &mut entry.fields[field_index];
            if field.value.is_empty() && field.end == field.start + 1 {
                field.multiline = true;
            }
            field.value.push_str(&value);
            field.end = index + 1;
            return Ok(());
        }

        let (keyword, rest) = trimmed
            .split_once(|c: char| c.is_whitespace())
            .ok_or_else(|| SyncError::po_parse(index + 1, format!("unexpected line '{}'", trimmed)))?;
        let kind = parse_keyword(keyword)
            .ok_or_else(|| SyncError::po_parse(index + 1, format!("unknown keyword '{}'", keyword)))?;
        let value = parse_quoted(rest.trim(), index + 1)?;

        self.start_field(index, kind)?;
        if let Some(entry) = self.current.as_mut() {
            entry.fields.push(FieldSpan {
                kind,
                start: index,
                end: index + 1,
                value,
                multiline: false,
            });
            self.open_field = Some(entry.fields.len() - 1);
        }
        Ok(())
    }

    /// Open a new entry when `kind` cannot belong to the current one
    fn start_field(&mut self, index: usize, kind: FieldKind) -> Result<()> {
        let (has_ctxt, has_msgid, has_msgstr) = match &self.current {
            Some(e) => (
                e.field(FieldKind::Msgctxt).is_some(),
                e.field(FieldKind::Msgid).is_some(),
                e.has_msgstr(),
            ),
            None => (false, false, false),
        };

        let starts_entry = match kind {
            FieldKind::Msgctxt => true,
            FieldKind::Msgid => !has_ctxt || has_msgid || has_msgstr,
            FieldKind::MsgidPlural | FieldKind::Msgstr(_) => {
                if !has_msgid {
                    return Err(SyncError::po_parse(
                        index + 1,
                        format!("'{}' before msgid", kind.keyword()),
                    ));
                }
                false
            }
        };

        if !starts_entry {
            if kind == FieldKind::MsgidPlural && has_msgstr {
                return Err(SyncError::po_parse(index + 1, "msgid_plural after msgstr"));
            }
            return Ok(());
        }

        if self.current.is_some() {
            // A msgid directly after a lone msgctxt belongs to it
            let lone_ctxt = kind == FieldKind::Msgid && has_ctxt && !has_msgid;
            if !lone_ctxt {
                self.flush(index)?;
            }
        }

        if self.current.is_none() {
            self.current = Some(ScannedEntry {
                first_line: self.pending_first_line.take().unwrap_or(index),
                comments: std::mem::take(&mut self.pending_comments),
                fields: Vec::new(),
            });
        }
        Ok(())
    }

    fn flush(&mut self, index: usize) -> Result<()> {
        if let Some(entry) = self.current.take() {
            if entry.field(FieldKind::Msgid).is_none() {
                return Err(SyncError::po_parse(index + 1, "msgctxt without msgid"));
            }
            if !entry.has_msgstr() {
                return Err(SyncError::po_parse(index + 1, "entry without msgstr"));
            }
            self.entries.push(entry);
        }
        self.open_field = None;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<ScannedEntry>> {
        let end = self
            .current
            .as_ref()
            .and_then(|e| e.fields.last())
            .map(|f| f.end)
            .unwrap_or(0);
        self.flush(end)?;
        Ok(self.entries)
    }
}

fn parse_keyword(keyword: &str) -> Option<FieldKind> {
    match keyword {
        "msgctxt" => Some(FieldKind::Msgctxt),
        "msgid" => Some(FieldKind::Msgid),
        "msgid_plural" => Some(FieldKind::MsgidPlural),
        "msgstr" => Some(FieldKind::Msgstr(None)),
        other => other
            .strip_prefix("msgstr[")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|n| n.trim().parse().ok())
            .map(|n| FieldKind::Msgstr(Some(n))),
    }
}

/// Decode one `"..."` token. `line` is 1-indexed for error messages.
fn parse_quoted(token: &str, line: usize) -> Result<String> {
    let inner = token
        .strip_prefix('"')
        .ok_or_else(|| SyncError::po_parse(line, format!("expected a quoted string, found '{}'", token)))?;

    let mut escaped = false;
    for (offset, ch) in inner.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => {
                let trailing = inner[offset + 1..].trim();
                if !trailing.is_empty() && !trailing.starts_with('#') {
                    return Err(SyncError::po_parse(
                        line,
                        format!("unexpected text after string: '{}'", trailing),
                    ));
                }
                return Ok(unescape(&inner[..offset]));
            }
            _ => {}
        }
    }
    Err(SyncError::po_parse(line, "unterminated string"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> Result<Vec<ScannedEntry>> {
        scan_entries(&split_lines(text))
    }

    #[test]
    fn test_scan_spans() {
        let text = "# header\nmsgid \"\"\nmsgstr \"\"\n\"Language: fr\\n\"\n\n#: src/app.rs:10\nmsgctxt \"menu\"\nmsgid \"File\"\nmsgstr \"Fichier\"\n";
        let entries = scan(text).unwrap();
        assert_eq!(entries.len(), 2);

        let header = &entries[0];
        assert!(header.is_header());
        let msgstr = header.msgstr_slot(0).unwrap();
        assert_eq!((msgstr.start, msgstr.end), (2, 4));
        assert!(msgstr.multiline);
        assert_eq!(msgstr.value, "Language: fr\n");

        let file = &entries[1];
        assert_eq!(file.first_line, 5);
        assert_eq!(file.comments, vec!["#: src/app.rs:10".to_string()]);
        assert_eq!(file.msgctxt(), Some("menu"));
        assert_eq!(file.msgid(), Some("File"));
    }

    #[test]
    fn test_scan_entries_without_blank_separator() {
        let text = "msgid \"a\"\nmsgstr \"A\"\nmsgid \"b\"\nmsgstr \"B\"\n";
        let entries = scan(text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].msgid(), Some("b"));
    }

    #[test]
    fn test_comment_between_msgid_and_msgstr_keeps_association() {
        let text = "msgid \"one\"\n# note\nmsgstr \"uno\"\n";
        let entries = scan(text).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].msgstr_slot(0).unwrap().value, "uno");
        assert_eq!(entries[0].comments, vec!["# note".to_string()]);
    }

    #[test]
    fn test_scan_plural_slots() {
        let text = "msgid \"item\"\nmsgid_plural \"items\"\nmsgstr[0] \"objekt\"\nmsgstr[1] \"\"\n";
        let entries = scan(text).unwrap();
        let entry = &entries[0];
        assert!(entry.is_plural());
        assert_eq!(entry.msgstr_slot(1).unwrap().start, 3);
        assert_eq!(entry.msgstr_slot(0).unwrap().value, "objekt");
    }

    #[test]
    fn test_obsolete_lines_are_comments() {
        let text = "msgid \"a\"\nmsgstr \"A\"\n\n#~ msgid \"old\"\n#~ msgstr \"Old\"\n";
        assert_eq!(scan(text).unwrap().len(), 1);
    }

    #[test]
    fn test_scan_errors() {
        assert!(scan("msgid \"unterminated\nmsgstr \"x\"\n").is_err());
        assert!(scan("\"orphan\"\n").is_err());
        assert!(scan("msgstr \"no id\"\n").is_err());
        assert!(scan("msgid \"a\"\nmsgfoo \"b\"\n").is_err());
        assert!(scan("msgid \"a\"\n").is_err());
    }
}
