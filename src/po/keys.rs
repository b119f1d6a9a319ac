//! Linearized PO keys: `context|msgid` plus an optional `__plural_N` suffix.

/// Separates context from msgid; only the first one is structural
pub const CONTEXT_SEPARATOR: char = '|';

pub const PLURAL_SUFFIX: &str = "__plural_";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueKey {
    pub context: Option<String>,
    pub msgid: String,
}

pub fn create_unique_key(msgid: &str, context: Option<&str>) -> String {
    match context {
        Some(context) => format!("{}{}{}", context, CONTEXT_SEPARATOR, msgid),
        None => msgid.to_string(),
    }
}

/// Split on the first `|`; the msgid may contain more of them
pub fn parse_unique_key(key: &str) -> UniqueKey {
    match key.split_once(CONTEXT_SEPARATOR) {
        Some((context, msgid)) => UniqueKey {
            context: Some(context.to_string()),
            msgid: msgid.to_string(),
        },
        None => UniqueKey {
            context: None,
            msgid: key.to_string(),
        },
    }
}

/// Key addressing plural form `index` (≥ 1) of `base`
pub fn plural_key(base: &str, index: usize) -> String {
    format!("{}{}{}", base, PLURAL_SUFFIX, index)
}

/// `"item__plural_2"` → `("item", 2)`; keys without a suffix have index 0
pub fn split_plural_suffix(key: &str) -> (&str, usize) {
    if let Some(pos) = key.rfind(PLURAL_SUFFIX) {
        let digits = &key[pos + PLURAL_SUFFIX.len()..];
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = digits.parse::<usize>() {
                if index >= 1 {
                    return (&key[..pos], index);
                }
            }
        }
    }
    (key, 0)
}
