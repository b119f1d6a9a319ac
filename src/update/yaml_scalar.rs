//! How YAML scalars are written: quote style detection, plain-safety and
//! block literals.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static NUMBER_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[-+]?(?:[0-9][0-9_]*(?:\.[0-9_]*)?(?:[eE][-+]?[0-9]+)?|\.[0-9]+(?:[eE][-+]?[0-9]+)?|0x[0-9a-fA-F]+|0o[0-7]+|\.(?:inf|Inf|INF))|\.(?:nan|NaN|NAN)|[0-9]{4}-[0-9]{2}-[0-9]{2}.*)$",
    )
    .expect("number pattern is valid")
});

/// Words that YAML 1.1 loaders (Ruby's Psych among them) read as booleans
/// or null
const RESERVED_WORDS: &[&str] = &[
    "null", "~", "true", "false", "yes", "no", "on", "off", "y", "n",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Plain,
    Single,
    Double,
    /// `|` or `>` block scalar
    Block,
}

impl QuoteStyle {
    /// Style of an inline value as written after `key:`
    pub fn of(inline: &str) -> Self {
        match inline.trim_start().chars().next() {
            Some('"') => Self::Double,
            Some('\'') => Self::Single,
            Some('|') | Some('>') => Self::Block,
            _ => Self::Plain,
        }
    }
}

/// Can `value` be written without quotes and read back as the same string?
pub fn is_plain_safe(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if value.trim() != value {
        return false;
    }
    if "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        return false;
    }
    if value.contains(": ") || value.contains(" #") || value.ends_with(':') {
        return false;
    }
    if value.chars().any(|c| c.is_control()) {
        return false;
    }
    let lower = value.to_ascii_lowercase();
    if RESERVED_WORDS.contains(&lower.as_str()) {
        return false;
    }
    !NUMBER_LIKE.is_match(value)
}

/// Array items are quoted as soon as they contain anything YAML might
/// interpret, including `%{…}` interpolation markers
pub fn needs_quotes_in_sequence(item: &str) -> bool {
    item.contains(':') || item.contains('"') || item.contains('\'') || item.contains("%{")
        || !is_plain_safe(item)
}

pub fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Inline text for a single-line string, honouring the style it replaces
pub fn inline_string(value: &str, previous: QuoteStyle) -> String {
    match previous {
        QuoteStyle::Double => double_quoted(value),
        QuoteStyle::Single if !value.chars().any(|c| c.is_control()) => single_quoted(value),
        _ if is_plain_safe(value) => value.to_string(),
        _ => double_quoted(value),
    }
}

/// Inline text for a key
pub fn render_key(key: &str) -> String {
    if is_plain_safe(key) {
        key.to_string()
    } else {
        double_quoted(key)
    }
}

/// Inline text for a non-string leaf, or `None` for strings and containers
pub fn inline_primitive(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Item text inside a block sequence
pub fn sequence_item(value: &Value) -> String {
    match value {
        Value::String(s) if needs_quotes_in_sequence(s) => double_quoted(s),
        Value::String(s) => s.clone(),
        // Nested containers use flow style; JSON is valid YAML flow
        Value::Array(_) | Value::Object(_) => value.to_string(),
        other => inline_primitive(other).unwrap_or_default(),
    }
}

/// Header (`|`, `|-`, `|+`, with an indentation indicator when the first
/// line starts with a space) and body lines of a block literal. Body lines
/// are indented by `indent`; empty lines stay empty.
pub fn block_literal(value: &str, indent: usize) -> (String, Vec<String>) {
    let content = value.trim_end_matches('\n');
    let trailing = value.len() - content.len();
    let chomp = match trailing {
        0 => "-",
        1 => "",
        _ => "+",
    };
    let indicator = if content.starts_with(' ') {
        indent.to_string()
    } else {
        String::new()
    };

    let pad = " ".repeat(indent);
    let mut lines: Vec<String> = content
        .split('\n')
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect();
    if trailing > 1 {
        lines.extend(std::iter::repeat(String::new()).take(trailing - 1));
    }
    (format!("|{}{}", indicator, chomp), lines)
}

/// Split a trailing `# comment` (with its leading whitespace) off an inline
/// scalar
pub fn split_inline_comment(inline: &str) -> (&str, &str) {
    let trimmed_start = inline.len() - inline.trim_start().len();
    let body = &inline[trimmed_start..];
    let end_of_value = match body.chars().next() {
        Some('"') => closing_quote(body, '"').map(|i| trimmed_start + i + 1),
        Some('\'') => closing_quote(body, '\'').map(|i| trimmed_start + i + 1),
        _ => None,
    };

    let search_from = end_of_value.unwrap_or(0);
    let rest = &inline[search_from..];
    let comment_at = if end_of_value.is_some() {
        rest.find('#')
            .filter(|i| rest[..*i].trim().is_empty())
    } else if rest.trim_start().starts_with('#') {
        rest.find('#')
    } else {
        rest.find(" #").or_else(|| rest.find("\t#"))
    };

    match comment_at {
        Some(i) => {
            let split = search_from + i;
            let value_end = inline[..split].trim_end().len();
            (&inline[..value_end], &inline[value_end..])
        }
        None => (inline, ""),
    }
}

/// Byte offset of the quote closing the string that `text` opens
pub(crate) fn closing_quote(text: &str, quote: char) -> Option<usize> {
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((i, ch)) = chars.next() {
        if quote == '"' && ch == '\\' {
            chars.next();
            continue;
        }
        if ch == quote {
            if quote == '\'' && matches!(chars.peek(), Some((_, '\''))) {
                chars.next();
                continue;
            }
            return Some(i);
        }
    }
    None
}

/// Decode a key as written (`plain`, `"double"` or `'single'`)
pub fn decode_key(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].replace("''", "'");
    }
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return unescape_double(&raw[1..raw.len() - 1]);
    }
    raw.to_string()
}

fn unescape_double(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_safety() {
        assert!(is_plain_safe("Hello world"));
        assert!(is_plain_safe("Hello, %{name}!"));
        assert!(is_plain_safe("10 items"));
        assert!(!is_plain_safe(""));
        assert!(!is_plain_safe("%{count} items"));
        assert!(!is_plain_safe("Note: read this"));
        assert!(!is_plain_safe("yes"));
        assert!(!is_plain_safe("No"));
        assert!(!is_plain_safe("42"));
        assert!(!is_plain_safe("3.14"));
        assert!(!is_plain_safe("2024-01-01"));
        assert!(!is_plain_safe(" padded"));
        assert!(!is_plain_safe("- dash"));
        assert!(!is_plain_safe("a # not a comment"));
    }

    #[test]
    fn test_inline_string_keeps_style() {
        assert_eq!(inline_string("Hi, %{name}!", QuoteStyle::Double), "\"Hi, %{name}!\"");
        assert_eq!(inline_string("it's", QuoteStyle::Single), "'it''s'");
        assert_eq!(inline_string("plain", QuoteStyle::Plain), "plain");
        assert_eq!(inline_string("yes", QuoteStyle::Plain), "\"yes\"");
    }

    #[test]
    fn test_sequence_items() {
        assert_eq!(sequence_item(&json!("Monday")), "Monday");
        assert_eq!(sequence_item(&json!("at: noon")), "\"at: noon\"");
        assert_eq!(sequence_item(&json!("Hi %{name}")), "\"Hi %{name}\"");
        assert_eq!(sequence_item(&json!(3)), "3");
    }

    #[test]
    fn test_block_literal_chomping() {
        let (header, lines) = block_literal("one\n\ntwo", 4);
        assert_eq!(header, "|-");
        assert_eq!(lines, vec!["    one", "", "    two"]);

        assert_eq!(block_literal("one\ntwo\n", 2).0, "|");
        assert_eq!(block_literal("one\ntwo\n\n", 2).0, "|+");
        assert_eq!(block_literal("  indented\nnext", 2).0, "|2-");
    }

    #[test]
    fn test_split_inline_comment() {
        assert_eq!(split_inline_comment(" value # note"), (" value", " # note"));
        assert_eq!(split_inline_comment(" \"a # b\"  # note"), (" \"a # b\"", "  # note"));
        assert_eq!(split_inline_comment(" 'it''s' #x"), (" 'it''s'", " #x"));
        assert_eq!(split_inline_comment(" value"), (" value", ""));
        assert_eq!(split_inline_comment(" # only"), ("", " # only"));
    }

    #[test]
    fn test_decode_key() {
        assert_eq!(decode_key("plain"), "plain");
        assert_eq!(decode_key("'it''s'"), "it's");
        assert_eq!(decode_key("\"a\\\"b\""), "a\"b");
    }
}
