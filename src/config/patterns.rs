use crate::error::{Result, SyncError};
use once_cell::sync::Lazy;
use regex::Regex;

/// `fr`, `pt-BR`
pub static LOCALE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").expect("locale pattern is valid"));

/// Default globs for translation files, relative to the project root
pub fn default_include_globs() -> Vec<String> {
    [
        // Rails, Vue, i18next layouts
        "**/locales/**/*.{json,yml,yaml}",
        "**/locale/**/*.{json,yml,yaml}",
        "**/i18n/**/*.{json,yml,yaml}",
        "**/lang/**/*.{json,yml,yaml}",
        "**/translations/**/*.{json,yml,yaml}",
        // gettext catalogs live anywhere
        "**/*.po",
        "**/*.pot",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn is_valid_locale(code: &str) -> bool {
    LOCALE_CODE.is_match(code)
}

pub fn validate_locale(code: &str) -> Result<()> {
    if is_valid_locale(code) {
        Ok(())
    } else {
        Err(SyncError::InvalidLocale(code.to_string()))
    }
}

/// Compile a user-supplied locale regex. It should capture the locale in a
/// group named `locale`, or in its first group.
pub fn compile_locale_pattern(pattern: &str) -> Result<Regex> {
    let regex = Regex::new(pattern).map_err(|e| SyncError::invalid_pattern(pattern, e))?;
    if regex.captures_len() < 2 {
        return Err(SyncError::invalid_pattern(
            pattern,
            "the pattern needs a capture group for the locale",
        ));
    }
    Ok(regex)
}
