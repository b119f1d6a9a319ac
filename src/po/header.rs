//! Header for catalogs created from a template, the way `msginit` starts
//! a new translation.

use super::scan::{scan_entries, split_lines, strip_eol};

/// The header entry of `template`, verbatim except that the `fuzzy` flag is
/// dropped and `Language:` names `locale`. `None` when the template has no
/// header or cannot be scanned.
pub fn header_from_template(template: &str, locale: Option<&str>) -> Option<String> {
    let lines = split_lines(template);
    let scanned = scan_entries(&lines).ok()?;
    let header = scanned.first().filter(|e| e.is_header())?;
    let msgstr = header.msgstr_slot(0)?;
    let end = header.fields.iter().map(|f| f.end).max()?;
    let eol = if template.contains("\r\n") { "\r\n" } else { "\n" };
    let language_line = locale.map(|l| format!("\"Language: {}\\n\"{}", l, eol));

    let mut text = String::new();
    let mut has_language = false;
    for (index, line) in lines.iter().enumerate().take(end).skip(header.first_line) {
        let bare = strip_eol(line).trim();
        if bare == "#, fuzzy" {
            continue;
        }
        let in_msgstr = (msgstr.start..msgstr.end).contains(&index);
        match &language_line {
            Some(language) if in_msgstr && bare.starts_with("\"Language:") => {
                has_language = true;
                text.push_str(language);
            }
            _ => {
                text.push_str(strip_eol(line));
                text.push_str(eol);
            }
        }
        if index + 1 == msgstr.end && !has_language {
            if let Some(language) = &language_line {
                text.push_str(language);
            }
        }
    }
    Some(text)
}
