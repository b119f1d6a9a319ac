//! Line-based model of a block-style YAML document.
//!
//! Only the mapping skeleton is understood: every `key:` line, its
//! indentation and the lines that belong to it. Everything else (comments,
//! blank lines, quoting, anchors, flow collections, block scalars) is kept as
//! the exact text it was read from. Edits replace whole entries, so untouched
//! entries render byte for byte.

use serde_json::Value;

use super::yaml_scalar::{
    block_literal, closing_quote, decode_key, inline_primitive, inline_string, render_key,
    sequence_item, split_inline_comment, QuoteStyle,
};

const DEFAULT_STEP: usize = 2;

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    /// Comment and blank lines directly above the key line
    leading: Vec<String>,
    /// Indentation, key as written and the colon
    head: String,
    key: String,
    /// Everything after the colon on the key line
    inline: String,
    /// Deeper lines of a scalar value (block scalars, sequences, folded
    /// plain or quoted text)
    continuation: Vec<String>,
    children: Option<Mapping>,
}

#[derive(Debug, Clone, PartialEq)]
struct Mapping {
    indent: usize,
    entries: Vec<Entry>,
    trailing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YamlDocument {
    header: Vec<String>,
    root: Mapping,
    step: usize,
    eol: &'static str,
    final_newline: bool,
}

impl YamlDocument {
    /// An empty document with two-space indentation
    pub fn empty() -> Self {
        Self {
            header: Vec::new(),
            root: Mapping::new(0),
            step: DEFAULT_STEP,
            eol: "\n",
            final_newline: true,
        }
    }

    /// A fresh block-style rendering of `tree`
    pub fn from_value(tree: &Value) -> Self {
        let mut doc = Self::empty();
        if let Some(map) = tree.as_object() {
            for (key, value) in map {
                doc.root.set_leaf(key, value, doc.step);
            }
        }
        doc
    }

    /// Read the mapping skeleton of `text`. Fails on constructs the model
    /// cannot address (flow or sequence documents, multiple documents,
    /// inconsistent indentation).
    pub fn parse(text: &str) -> Result<Self, String> {
        let eol = if text.contains("\r\n") { "\r\n" } else { "\n" };
        let final_newline = text.is_empty() || text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        let body = body.strip_suffix('\r').unwrap_or(body);
        let lines: Vec<String> = if body.is_empty() {
            Vec::new()
        } else {
            body.split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
                .collect()
        };

        let mut header = Vec::new();
        let mut start = 0;
        while let Some(line) = lines.get(start) {
            let trimmed = line.trim();
            let is_marker = trimmed == "---" || trimmed.starts_with("--- #") || trimmed.starts_with('%');
            if !(is_trivia(line) || is_marker) {
                break;
            }
            header.push(line.clone());
            start += 1;
        }

        let root = match lines.get(start) {
            Some(first) => parse_mapping(&lines[start..], indent_of(first))?,
            None => Mapping::new(0),
        };
        let step = detect_step(&root).unwrap_or(DEFAULT_STEP);

        Ok(Self {
            header,
            root,
            step,
            eol,
            final_newline,
        })
    }

    /// Write `value` at `path`, creating parent mappings as needed.
    ///
    /// Returns the depth of a parent that held a non-empty scalar or flow
    /// value and had to be replaced by an empty block mapping; the caller
    /// should re-`set` that parent with its full contents.
    pub fn set(&mut self, path: &[String], value: &Value) -> Option<usize> {
        let (last, parents) = path.split_last()?;
        let step = self.step;
        let mut replaced = None;
        let mut mapping = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            let (child, discarded) = mapping.child_mapping(segment, step);
            if discarded && replaced.is_none() {
                replaced = Some(depth);
            }
            mapping = child;
        }
        mapping.set_leaf(last, value, step);
        replaced
    }

    /// Remove the entry at `path`. Mappings emptied by the removal are
    /// removed too, except the first `keep_depth` levels, which are left as
    /// `{}`.
    pub fn remove(&mut self, path: &[String], keep_depth: usize) -> bool {
        self.root.remove(path, keep_depth)
    }

    pub fn render(&self) -> String {
        let mut lines = self.header.clone();
        self.root.render(&mut lines);
        if lines.is_empty() {
            return String::new();
        }
        let mut out = lines.join(self.eol);
        if self.final_newline {
            out.push_str(self.eol);
        }
        out
    }
}

impl Mapping {
    fn new(indent: usize) -> Self {
        Self {
            indent,
            entries: Vec::new(),
            trailing: Vec::new(),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    fn entry_index(&mut self, key: &str) -> usize {
        match self.position(key) {
            Some(index) => index,
            None => {
                self.entries.push(Entry::new(self.indent, key));
                self.entries.len() - 1
            }
        }
    }

    /// The block mapping under `key`. The flag is set when a non-empty
    /// scalar had to be discarded to make room for it.
    fn child_mapping(&mut self, key: &str, step: usize) -> (&mut Mapping, bool) {
        let child_indent = self.indent + step;
        let index = self.entry_index(key);
        let entry = &mut self.entries[index];

        let mut discarded = false;
        if entry.children.is_none() {
            discarded = entry.has_scalar_value();
            let (_, comment) = split_inline_comment(&entry.inline);
            entry.inline = comment.to_string();
            entry.continuation.clear();
        }
        let child = entry
            .children
            .get_or_insert_with(|| Mapping::new(child_indent));
        (child, discarded)
    }

    fn set_leaf(&mut self, key: &str, value: &Value, step: usize) {
        let indent = self.indent;
        let index = self.entry_index(key);
        self.entries[index].assign(value, indent, step);
    }

    fn remove(&mut self, path: &[String], keep_depth: usize) -> bool {
        let Some((first, rest)) = path.split_first() else {
            return false;
        };
        let Some(index) = self.position(first) else {
            return false;
        };
        if rest.is_empty() {
            self.remove_entry(index);
            return true;
        }

        let entry = &mut self.entries[index];
        let Some(child) = entry.children.as_mut() else {
            return false;
        };
        if !child.remove(rest, keep_depth.saturating_sub(1)) {
            return false;
        }
        if child.entries.is_empty() {
            if keep_depth == 0 {
                self.remove_entry(index);
            } else {
                let trailing = std::mem::take(&mut child.trailing);
                entry.children = None;
                entry.inline = " {}".to_string();
                self.carry_trivia(index + 1, trailing);
            }
        }
        true
    }

    /// Drop an entry. Blank lines and section comments above it stay; the
    /// comment block attached directly to the key goes with it.
    fn remove_entry(&mut self, index: usize) {
        let entry = self.entries.remove(index);
        let keep = entry
            .leading
            .iter()
            .rposition(|line| line.trim().is_empty())
            .map(|i| i + 1)
            .unwrap_or(0);
        let mut trivia: Vec<String> = entry.leading[..keep].to_vec();
        if let Some(children) = entry.children {
            trivia.extend(children.trailing.into_iter().filter(|l| l.trim().is_empty()));
        }
        self.carry_trivia(index, trivia);
    }

    /// Prepend trivia lines to the entry at `index`, or to the trailing lines
    fn carry_trivia(&mut self, index: usize, mut trivia: Vec<String>) {
        if trivia.is_empty() {
            return;
        }
        match self.entries.get_mut(index) {
            Some(next) => {
                trivia.append(&mut next.leading);
                next.leading = trivia;
            }
            None => {
                trivia.append(&mut self.trailing);
                self.trailing = trivia;
            }
        }
    }

    fn render(&self, out: &mut Vec<String>) {
        for entry in &self.entries {
            out.extend(entry.leading.iter().cloned());
            out.push(format!("{}{}", entry.head, entry.inline));
            out.extend(entry.continuation.iter().cloned());
            if let Some(children) = &entry.children {
                children.render(out);
            }
        }
        out.extend(self.trailing.iter().cloned());
    }
}

impl Entry {
    fn new(indent: usize, key: &str) -> Self {
        Self {
            leading: Vec::new(),
            head: format!("{}{}:", " ".repeat(indent), render_key(key)),
            key: key.to_string(),
            inline: String::new(),
            continuation: Vec::new(),
            children: None,
        }
    }

    fn has_scalar_value(&self) -> bool {
        let (value, _) = split_inline_comment(&self.inline);
        let trivial = matches!(value.trim(), "" | "{}" | "~" | "null");
        !trivial || self.continuation.iter().any(|line| !is_trivia(line))
    }

    /// Indentation of the items of an existing block sequence
    fn sequence_indent(&self) -> Option<usize> {
        self.continuation
            .iter()
            .find(|line| !is_trivia(line))
            .filter(|line| is_sequence_item(line.trim_start()))
            .map(|line| indent_of(line))
    }

    /// Replace the value, keeping the key line, its quote style where the
    /// new value allows it, and any trailing comment
    fn assign(&mut self, value: &Value, indent: usize, step: usize) {
        let previous = QuoteStyle::of(&self.inline);
        let comment = split_inline_comment(&self.inline).1.to_string();
        let item_indent = self.sequence_indent();
        let child_indent = indent + step;

        self.children = None;
        self.continuation.clear();

        match value {
            Value::String(s) if s.contains('\n') => {
                let (header, lines) = block_literal(s, child_indent);
                self.inline = format!(" {}{}", header, comment);
                self.continuation = lines;
            }
            Value::String(s) => {
                self.inline = format!(" {}{}", inline_string(s, previous), comment);
            }
            Value::Array(items) if items.is_empty() => {
                self.inline = format!(" []{}", comment);
            }
            Value::Array(items) => {
                let pad = " ".repeat(item_indent.unwrap_or(child_indent));
                self.inline = comment;
                self.continuation = items
                    .iter()
                    .map(|item| format!("{}- {}", pad, sequence_item(item)))
                    .collect();
            }
            Value::Object(map) if map.is_empty() => {
                self.inline = format!(" {{}}{}", comment);
            }
            Value::Object(map) => {
                let mut children = Mapping::new(child_indent);
                for (key, child) in map {
                    children.set_leaf(key, child, step);
                }
                self.inline = comment;
                self.children = Some(children);
            }
            other => {
                let text = inline_primitive(other).unwrap_or_default();
                self.inline = format!(" {}{}", text, comment);
            }
        }
    }
}

fn parse_mapping(lines: &[String], indent: usize) -> Result<Mapping, String> {
    let mut mapping = Mapping::new(indent);
    let mut pending = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        if is_trivia(line) {
            pending.push(line.clone());
            i += 1;
            continue;
        }
        if indent_of(line) != indent {
            return Err(format!("unexpected indentation at `{}`", line.trim()));
        }

        let content = &line[indent..];
        if content == "---" || content == "..." {
            return Err("multiple documents are not supported".to_string());
        }
        let (key_raw, inline) = split_key_line(content)
            .ok_or_else(|| format!("expected `key: value` at `{}`", content.trim()))?;
        let head_len = line.len() - inline.len();

        let has_inline_value = {
            let (value, _) = split_inline_comment(inline);
            !value.trim().is_empty()
        };
        let mut end = i + 1;
        while let Some(next) = lines.get(end) {
            let belongs = is_trivia(next)
                || indent_of(next) > indent
                || (!has_inline_value
                    && indent_of(next) == indent
                    && is_sequence_item(&next[indent..]));
            if !belongs {
                break;
            }
            end += 1;
        }
        // Trailing blank lines and shallower comments introduce the next key
        while end > i + 1 {
            let last = &lines[end - 1];
            let detached = last.trim().is_empty() || (is_trivia(last) && indent_of(last) <= indent);
            if !detached {
                break;
            }
            end -= 1;
        }

        let mut entry = Entry {
            leading: std::mem::take(&mut pending),
            head: line[..head_len].to_string(),
            key: decode_key(key_raw),
            inline: inline.to_string(),
            continuation: Vec::new(),
            children: None,
        };
        let body = &lines[i + 1..end];
        match nested_mapping_indent(inline, body) {
            Some(child_indent) => entry.children = Some(parse_mapping(body, child_indent)?),
            None => entry.continuation = body.to_vec(),
        }
        mapping.entries.push(entry);
        i = end;
    }

    mapping.trailing = pending;
    Ok(mapping)
}

/// Indentation of the block mapping that `body` holds, if it is one. Anchors
/// and tags on the key line do not prevent nesting.
fn nested_mapping_indent(inline: &str, body: &[String]) -> Option<usize> {
    let (value, _) = split_inline_comment(inline);
    let properties_only = value
        .split_whitespace()
        .all(|token| token.starts_with('&') || token.starts_with('!'));
    if !properties_only {
        return None;
    }
    let first = body.iter().find(|line| !is_trivia(line))?;
    let content = first.trim_start();
    if is_sequence_item(content) || split_key_line(content).is_none() {
        return None;
    }
    Some(indent_of(first))
}

/// Split `key: rest` into the key as written and everything after the colon
fn split_key_line(content: &str) -> Option<(&str, &str)> {
    let first = content.chars().next()?;
    if first == '"' || first == '\'' {
        let close = closing_quote(content, first)?;
        let rest = content[close + 1..].trim_start();
        let after = rest.strip_prefix(':')?;
        if !(after.is_empty() || after.starts_with([' ', '\t'])) {
            return None;
        }
        return Some((&content[..=close], after));
    }
    if is_sequence_item(content) || "[{?#|>".contains(first) {
        return None;
    }

    let mut search = 0;
    loop {
        let pos = search + content[search..].find(':')?;
        let after = &content[pos + 1..];
        if after.is_empty() || after.starts_with([' ', '\t']) {
            let key = content[..pos].trim_end();
            if key.is_empty() || key.contains(" #") {
                return None;
            }
            return Some((key, after));
        }
        search = pos + 1;
    }
}

fn detect_step(mapping: &Mapping) -> Option<usize> {
    mapping.entries.iter().find_map(|entry| {
        let child = entry.children.as_ref()?;
        child
            .indent
            .checked_sub(mapping.indent)
            .filter(|step| *step > 0)
            .or_else(|| detect_step(child))
    })
}

fn is_trivia(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn is_sequence_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ") || content.starts_with("-\t")
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}
