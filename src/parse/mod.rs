pub mod json_parser;
pub mod payload;
pub mod translation;
pub mod yaml_parser;

pub use json_parser::JsonParser;
pub use payload::{OldValue, TranslationPayload, TranslationRecord};
pub use translation::{
    entries_from_flat, unwrap_language, EntryMetadata, FileFormat, TranslationEntry,
    TranslationFile, TranslationKeys,
};
pub use yaml_parser::YamlParser;
