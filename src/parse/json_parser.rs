use crate::error::{Result, SyncError};
use serde_json::Value;
use std::path::Path;

/// Parser for JSON translation files
pub struct JsonParser;

impl JsonParser {
    /// Parse JSON text into a tree, keeping key order.
    /// Falls back to stripping `//` and `/* */` comments (JSONC) when strict
    /// parsing fails.
    pub fn parse_str(content: &str, path: &Path) -> Result<Value> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        match serde_json::from_str(content) {
            Ok(root) => Ok(root),
            Err(strict_err) => {
                let cleaned_content = Self::strip_json_comments(content);
                serde_json::from_str(&cleaned_content).map_err(|_| {
                    SyncError::json_parse(path, format!("Invalid JSON syntax: {}", strict_err))
                })
            }
        }
    }

    /// Serialize a tree using the indentation detected in `original`
    pub fn to_string_like(tree: &Value, original: Option<&str>) -> Result<String> {
        let indent = original
            .and_then(Self::detect_indent)
            .unwrap_or_else(|| "  ".to_string());
        let ends_with_newline = original.map(|o| o.ends_with('\n')).unwrap_or(true);

        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        serde::Serialize::serialize(tree, &mut serializer)?;

        let mut output = String::from_utf8_lossy(&buffer).into_owned();
        if original.map(|o| o.contains("\r\n")).unwrap_or(false) {
            output = output.replace('\n', "\r\n");
        }
        if ends_with_newline {
            output.push_str(if output.contains("\r\n") { "\r\n" } else { "\n" });
        }
        Ok(output)
    }

    /// Leading whitespace of the first indented line
    fn detect_indent(content: &str) -> Option<String> {
        content
            .lines()
            .skip(1)
            .find(|line| !line.trim().is_empty() && line.starts_with([' ', '\t']))
            .map(|line| {
                line.chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .collect()
            })
    }

    /// Strip single-line (//) and multi-line (/* */) comments from JSON
    /// This enables parsing of JSONC (JSON with Comments) files
    fn strip_json_comments(content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();
        let mut in_string = false;
        let mut escape_next = false;

        while let Some(ch) = chars.next() {
            if escape_next {
                result.push(ch);
                escape_next = false;
                continue;
            }

            if ch == '\\' && in_string {
                result.push(ch);
                escape_next = true;
                continue;
            }

            if ch == '"' {
                in_string = !in_string;
                result.push(ch);
                continue;
            }

            if !in_string && ch == '/' {
                match chars.peek() {
                    Some('/') => {
                        // Single-line comment - skip until newline
                        chars.next();
                        for c in chars.by_ref() {
                            if c == '\n' {
                                result.push('\n');
                                break;
                            }
                        }
                        continue;
                    }
                    Some('*') => {
                        chars.next();
                        let mut prev = ' ';
                        for c in chars.by_ref() {
                            if prev == '*' && c == '/' {
                                break;
                            }
                            if c == '\n' {
                                result.push('\n');
                            }
                            prev = c;
                        }
                        continue;
                    }
                    _ => {}
                }
            }

            result.push(ch);
        }

        result
    }
}
