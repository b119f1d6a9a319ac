pub mod batch;
pub mod missing;

pub use batch::{
    batch_keys_with_missing, BatchError, BatchKey, BatchMetadata, BatchPayload, BatchResult,
    TranslationBatch, DEFAULT_MAX_BATCH_SIZE,
};
pub use missing::{
    find_missing_translations, find_missing_translations_by_locale, is_wip_value, MissingKey,
    MissingTranslationRecord, MissingTranslations, SkipReason, SkippedKey,
    SKIP_TRANSLATION_SENTINEL,
};
