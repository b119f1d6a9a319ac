pub mod config;
pub mod detect;
pub mod error;
pub mod fs;
pub mod keys;
pub mod locate;
pub mod logger;
pub mod parse;
pub mod po;
pub mod update;

use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

// Re-export commonly used types
pub use config::SyncConfig;
pub use detect::{
    batch_keys_with_missing, find_missing_translations, find_missing_translations_by_locale,
    BatchResult, MissingTranslationRecord, TranslationBatch,
};
pub use error::{Result, SyncError};
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use keys::{flatten, unflatten, StructureFormat};
pub use locate::{locate_translation_files, DiscoveryError, LocatedFiles, LocatorOptions};
pub use logger::{Logger, MemoryLogger, SilentLogger, TracingLogger};
pub use parse::{FileFormat, TranslationFile, TranslationPayload, TranslationRecord};
pub use po::{parse_po_file, surgical_update_po_file, SurgicalOptions};
pub use update::{
    delete_keys_from_translation_file, update_translation_file, UpdateOptions, UpdateOutcome,
};

/// Query parameters for a missing-translation scan
#[derive(Debug, Clone)]
pub struct MissingQuery {
    pub base_dir: PathBuf,
    pub config: SyncConfig,
    pub verbose: bool,
}

impl MissingQuery {
    pub fn new(base_dir: impl Into<PathBuf>, config: SyncConfig) -> Self {
        Self {
            base_dir: base_dir.into(),
            config,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Result of a missing-translation scan
#[derive(Debug, Clone, Serialize)]
pub struct MissingReport {
    pub source_files: Vec<PathBuf>,
    /// Keyed `"<locale>:<source path>"`
    pub records: IndexMap<String, MissingTranslationRecord>,
    pub batches: BatchResult,
    pub discovery_errors: Vec<DiscoveryError>,
}

impl MissingReport {
    pub fn missing_count(&self) -> usize {
        self.records.values().map(|r| r.keys.len()).sum()
    }
}

/// Locate translation files, compare every source file with its targets and
/// batch what is missing.
///
/// Without configured output locales, every non-source locale found on
/// disk is a target.
#[must_use = "this function returns a Result that should be handled"]
pub fn run_missing(fs: &dyn FileSystem, query: &MissingQuery, logger: &dyn Logger) -> Result<MissingReport> {
    query.config.validate()?;

    let options = LocatorOptions::from_config(&query.base_dir, &query.config).with_verbose(query.verbose);
    let located = locate_translation_files(fs, &options, logger)?;

    let mut targets = located.target_files_by_locale.clone();
    if query.config.output_locales.is_empty() {
        for file in located
            .all_files
            .iter()
            .filter(|f| f.locale != query.config.source_locale)
        {
            targets.entry(file.locale.clone()).or_default().push(file.clone());
        }
    }

    let records = find_missing_translations_by_locale(
        &located.source_files,
        &targets,
        &query.config,
        query.verbose,
        logger,
    );
    let batches = batch_keys_with_missing(&located.source_files, &records, query.config.max_batch_size);

    Ok(MissingReport {
        source_files: located.source_files.iter().map(|f| f.path.clone()).collect(),
        records,
        batches,
        discovery_errors: located.errors,
    })
}

/// Where and how to write a translation payload
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub target: PathBuf,
    /// Locale of the target file
    pub locale: Option<String>,
    /// Peer source file: shape for new JSON/YAML files, template for new
    /// PO entries and for the header of a new PO file
    pub source_file: Option<PathBuf>,
    pub source_locale: String,
    pub wrap_width: usize,
}

impl ApplyRequest {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            locale: None,
            source_file: None,
            source_locale: "en".to_string(),
            wrap_width: po::DEFAULT_WRAP_WIDTH,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>, locale: impl Into<String>) -> Self {
        self.source_file = Some(path.into());
        self.source_locale = locale.into();
        self
    }

    /// Source locale and wrap width from the shared settings
    pub fn from_config(target: impl Into<PathBuf>, config: &SyncConfig) -> Self {
        Self {
            source_locale: config.source_locale.clone(),
            wrap_width: config.wrap_width,
            ..Self::new(target)
        }
    }

    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }
}

/// Write `payload` into the request's target, choosing the surgical PO
/// editor or the JSON/YAML updater by extension
#[must_use = "this function returns a Result that should be handled"]
pub fn apply_translations(
    fs: &dyn FileSystem,
    request: &ApplyRequest,
    payload: &TranslationPayload,
    logger: &dyn Logger,
) -> Result<UpdateOutcome> {
    let target = request.target.as_path();
    let format =
        FileFormat::from_path(target).ok_or_else(|| SyncError::UnsupportedFormat(target.to_path_buf()))?;

    if !format.is_gettext() {
        let options = UpdateOptions {
            locale: request.locale.clone(),
            source_file_path: request.source_file.clone(),
            source_locale: Some(request.source_locale.clone()),
        };
        return update_translation_file(fs, target, &payload.to_map(), &options, logger);
    }

    let created = !fs.exists(target);
    let template = match request.source_file.as_deref().filter(|p| fs.exists(p)) {
        Some(source) => Some(fs.read_to_string(source)?),
        None => None,
    };
    let original = if created {
        template
            .as_deref()
            .and_then(|t| po::header_from_template(t, request.locale.as_deref()))
            .unwrap_or_default()
    } else {
        fs.read_to_string(target)?
    };

    let mut options = SurgicalOptions::new().with_wrap_width(request.wrap_width);
    if let Some(locale) = &request.locale {
        options = options.with_languages(request.source_locale.as_str(), locale.as_str());
    }
    if let Some(template) = template {
        options = options.with_source_content(template);
    }

    let updated = surgical_update_po_file(&original, payload, &options, logger)?;
    if updated != original {
        if created {
            if let Some(parent) = target.parent() {
                fs.create_dir_all(parent)?;
            }
        }
        fs.write(target, &updated)?;
    }

    Ok(UpdateOutcome {
        updated_keys: payload
            .records()
            .into_iter()
            .filter(|r| !r.value.is_null())
            .map(|r| r.key)
            .collect(),
        created,
    })
}
