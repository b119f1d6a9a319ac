use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for translation sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Failed to parse a gettext PO file
    #[error("Failed to parse PO file at line {line}: {reason}\n\nTip: The file cannot be edited safely until its syntax is fixed")]
    PoParse { line: usize, reason: String },

    /// Failed to parse YAML file
    #[error("Failed to parse YAML file {file}:\n{reason}\n\nTip: Verify the YAML syntax is correct")]
    YamlParse { file: PathBuf, reason: String },

    /// Failed to parse JSON file
    #[error("Failed to parse JSON file {file}:\n{reason}\n\nTip: Verify the JSON syntax is correct")]
    JsonParse { file: PathBuf, reason: String },

    /// A new JSON file needs a peer source file to copy its shape from
    #[error("Source file is required for creating new JSON translation files (target: {file})")]
    SourceFileRequired { file: PathBuf },

    /// The document is wrapped in a locale key but no locale was given
    #[error("Locale is required to write {file}: its content is wrapped in a language key")]
    LocaleRequired { file: PathBuf },

    /// Locale code does not follow the `xx` / `xx-XX` convention
    #[error("Invalid locale code '{0}': expected a two-letter language with an optional uppercase region (e.g. 'fr' or 'pt-BR')")]
    InvalidLocale(String),

    /// Two flat keys resolve to the same position in a nested tree
    #[error("Key '{key}' collides with an existing {existing} at '{path}'")]
    KeyCollision {
        key: String,
        path: String,
        existing: &'static str,
    },

    /// User supplied glob or regex could not be compiled
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Unsupported file extension for a translation file
    #[error("Unsupported translation file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// A translation batch payload could not be decoded
    #[error("Invalid batch payload: {0}")]
    InvalidPayload(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a document or payload failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Create a PoParse error for a 1-indexed line
    pub fn po_parse(line: usize, reason: impl Into<String>) -> Self {
        Self::PoParse {
            line,
            reason: reason.into(),
        }
    }

    /// Create a YamlParse error from a file path and reason
    pub fn yaml_parse(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::YamlParse {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a JsonParse error from a file path and reason
    pub fn json_parse(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::JsonParse {
            file: file.into(),
            reason: reason.into(),
        }
    }

    pub fn key_collision(key: impl Into<String>, path: impl Into<String>, existing: &'static str) -> Self {
        Self::KeyCollision {
            key: key.into(),
            path: path.into(),
            existing,
        }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for SyncError
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_po_parse_error() {
        let err = SyncError::po_parse(12, "unterminated string");
        let msg = err.to_string();
        assert!(msg.contains("line 12"));
        assert!(msg.contains("unterminated string"));
        assert!(msg.contains("Tip:"));
    }

    #[test]
    fn test_yaml_parse_error() {
        let err = SyncError::yaml_parse("config/locales/en.yml", "unexpected character");
        let msg = err.to_string();
        assert!(msg.contains("config/locales/en.yml"));
        assert!(msg.contains("unexpected character"));
        assert!(msg.contains("YAML syntax"));
    }

    #[test]
    fn test_source_file_required_message() {
        let err = SyncError::SourceFileRequired {
            file: PathBuf::from("locales/fr.json"),
        };
        assert!(err
            .to_string()
            .contains("Source file is required for creating new JSON translation files"));
    }

    #[test]
    fn test_key_collision_error() {
        let err = SyncError::key_collision("buttons.submit.label", "buttons.submit", "value");
        let msg = err.to_string();
        assert!(msg.contains("buttons.submit.label"));
        assert!(msg.contains("existing value"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let sync_err: SyncError = io_err.into();
        let msg = sync_err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("file not found"));
    }
}
