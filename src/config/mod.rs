pub mod exclusions;
pub mod patterns;

pub use exclusions::{detect_project_type, exclusion_globs, get_default_exclusions, ProjectType};
pub use patterns::{
    compile_locale_pattern, default_include_globs, is_valid_locale, validate_locale, LOCALE_CODE,
};

use crate::detect::DEFAULT_MAX_BATCH_SIZE;
use crate::po::DEFAULT_WRAP_WIDTH;
use serde::Deserialize;

/// Settings shared by discovery, detection and write-back.
///
/// Loading this from a file is left to the caller; it deserializes with
/// every field optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub source_locale: String,
    pub output_locales: Vec<String>,
    /// Globs selecting translation files
    pub include: Vec<String>,
    /// Globs excluded on top of the project type's defaults
    pub exclude: Vec<String>,
    /// Regex with a `locale` capture group, tried after the built-in rules
    pub locale_pattern: Option<String>,
    pub max_batch_size: usize,
    pub wrap_width: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source_locale: "en".to_string(),
            output_locales: Vec::new(),
            include: default_include_globs(),
            exclude: Vec::new(),
            locale_pattern: None,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }
}

impl SyncConfig {
    pub fn new(source_locale: impl Into<String>) -> Self {
        Self {
            source_locale: source_locale.into(),
            ..Self::default()
        }
    }

    pub fn with_output_locales(mut self, locales: Vec<String>) -> Self {
        self.output_locales = locales;
        self
    }

    pub fn with_includes(mut self, includes: Vec<String>) -> Self {
        self.include = includes;
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclude = exclusions;
        self
    }

    pub fn with_locale_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.locale_pattern = Some(pattern.into());
        self
    }

    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size.max(1);
        self
    }

    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    /// Every configured locale must follow the `xx` / `xx-XX` rule
    pub fn validate(&self) -> crate::Result<()> {
        validate_locale(&self.source_locale)?;
        for locale in &self.output_locales {
            validate_locale(locale)?;
        }
        if let Some(pattern) = &self.locale_pattern {
            compile_locale_pattern(pattern)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.source_locale, "en");
        assert_eq!(config.max_batch_size, 200);
        assert_eq!(config.wrap_width, 79);
        assert!(!config.include.is_empty());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SyncConfig = serde_json::from_str(
            r#"{"source_locale": "sv", "output_locales": ["en", "de-AT"], "max_batch_size": 100}"#,
        )
        .unwrap();
        assert_eq!(config.source_locale, "sv");
        assert_eq!(config.max_batch_size, 100);
        assert_eq!(config.wrap_width, 79);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_locales() {
        let config = SyncConfig::new("en").with_output_locales(vec!["pt_br".to_string()]);
        assert!(config.validate().is_err());
        let config = SyncConfig::new("en").with_locale_pattern("no-group");
        assert!(config.validate().is_err());
    }
}
