//! Quoting and line layout of PO string fields.

/// gettext's default `--width`
pub const DEFAULT_WRAP_WIDTH: usize = 79;

/// Escape a value for a PO string literal
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Decode the content of a PO string literal (without the quotes)
pub fn unescape(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some('a') => result.push('\u{07}'),
            Some('b') => result.push('\u{08}'),
            Some('f') => result.push('\u{0c}'),
            Some('v') => result.push('\u{0b}'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    /// `msgstr "value"`
    SingleLine,
    /// `msgstr ""` followed by wrapped continuation strings
    MultiLine,
}

/// Decide the layout of a field being written.
///
/// A field that was multi-line stays multi-line. Otherwise a value with an
/// inner newline goes multi-line, and so does an over-long line in a file that
/// already wraps its strings.
pub fn choose_style(
    keyword: &str,
    value: &str,
    was_multiline: bool,
    file_wraps: bool,
    width: usize,
) -> FieldStyle {
    if was_multiline {
        return FieldStyle::MultiLine;
    }
    let inner_newline = value.trim_end_matches('\n').contains('\n');
    if inner_newline {
        return FieldStyle::MultiLine;
    }
    let single_len = keyword.chars().count() + 3 + escape(value).chars().count();
    if file_wraps && single_len > width {
        FieldStyle::MultiLine
    } else {
        FieldStyle::SingleLine
    }
}

/// Render a field as lines, each terminated by `eol`
pub fn render_field(keyword: &str, value: &str, style: FieldStyle, width: usize, eol: &str) -> String {
    match style {
        FieldStyle::SingleLine => format!("{} \"{}\"{}", keyword, escape(value), eol),
        FieldStyle::MultiLine => {
            let mut out = format!("{} \"\"{}", keyword, eol);
            for chunk in wrap_value(value, width) {
                out.push('"');
                out.push_str(&chunk);
                out.push('"');
                out.push_str(eol);
            }
            out
        }
    }
}

/// Split an (unescaped) value into escaped chunks: after every newline, then
/// at spaces so no chunk exceeds `width - 2` characters. A word longer than
/// the width gets a chunk of its own and is never split. An empty value has
/// no chunks.
pub fn wrap_value(value: &str, width: usize) -> Vec<String> {
    let max = width.saturating_sub(2).max(1);
    let mut chunks = Vec::new();

    for piece in value.split_inclusive('\n') {
        let escaped = escape(piece);
        let mut current = String::new();
        for word in escaped.split_inclusive(' ') {
            let fits = current.chars().count() + word.chars().count() <= max;
            if !current.is_empty() && !fits {
                chunks.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
    }

    chunks
}
