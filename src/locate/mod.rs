pub mod discover;
pub mod matching;
pub mod strategy;

pub use discover::{
    load_translation_file, locate_translation_files, namespace_of, relative_path, DiscoveryError,
    LocatedFiles, LocatorOptions,
};
pub use matching::{expected_target_path, find_target_file};
pub use strategy::{
    default_strategies, detect_locale, LocaleMatch, LocaleStrategy, LOCALE_PLACEHOLDER,
};
