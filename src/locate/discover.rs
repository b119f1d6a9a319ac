use crate::config::{compile_locale_pattern, detect_project_type, exclusion_globs, SyncConfig};
use crate::error::{Result, SyncError};
use crate::fs::FileSystem;
use crate::keys::{detect_format, flatten, flatten_strict, StructureFormat};
use crate::logger::Logger;
use crate::parse::{
    entries_from_flat, unwrap_language, FileFormat, JsonParser, TranslationFile, YamlParser,
};
use crate::po::{parse_po_file, po_entries_to_api_format, PoLanguages};
use ignore::overrides::{Override, OverrideBuilder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::strategy::{default_strategies, detect_locale, LocaleMatch, LOCALE_PLACEHOLDER};

/// Inputs of [`locate_translation_files`]
#[derive(Debug, Clone)]
pub struct LocatorOptions {
    pub base_dir: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub locale_pattern: Option<String>,
    pub source_locale: String,
    pub output_locales: Vec<String>,
    /// Log files that are skipped for lack of a locale
    pub verbose: bool,
}

impl LocatorOptions {
    pub fn new(base_dir: impl Into<PathBuf>, source_locale: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            locale_pattern: None,
            source_locale: source_locale.into(),
            output_locales: Vec::new(),
            verbose: false,
        }
    }

    pub fn from_config(base_dir: impl Into<PathBuf>, config: &SyncConfig) -> Self {
        Self {
            base_dir: base_dir.into(),
            include: config.include.clone(),
            exclude: config.exclude.clone(),
            locale_pattern: config.locale_pattern.clone(),
            source_locale: config.source_locale.clone(),
            output_locales: config.output_locales.clone(),
            verbose: false,
        }
    }

    pub fn with_includes(mut self, include: Vec<String>) -> Self {
        self.include = include;
        self
    }

    pub fn with_exclusions(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_output_locales(mut self, locales: Vec<String>) -> Self {
        self.output_locales = locales;
        self
    }

    pub fn with_locale_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.locale_pattern = Some(pattern.into());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Source locale first, then the outputs
    fn hints(&self) -> Vec<String> {
        std::iter::once(self.source_locale.clone())
            .chain(self.output_locales.iter().cloned())
            .collect()
    }
}

/// A file that was found but could not be used
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscoveryError {
    Unreadable { path: PathBuf, reason: String },
    ParseFailed { path: PathBuf, reason: String },
}

impl DiscoveryError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Unreadable { path, .. } | Self::ParseFailed { path, .. } => path,
        }
    }
}

/// Discovered files, partitioned by role
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocatedFiles {
    pub source_files: Vec<TranslationFile>,
    /// One entry per output locale, possibly empty
    pub target_files_by_locale: BTreeMap<String, Vec<TranslationFile>>,
    /// Every parsed file, including locales that are neither source nor output
    pub all_files: Vec<TranslationFile>,
    pub errors: Vec<DiscoveryError>,
}

/// Find, classify and parse translation files below `options.base_dir`.
///
/// Only invalid patterns and an unreadable base directory are errors; a file
/// that cannot be read or parsed is logged and reported in `errors`.
pub fn locate_translation_files(
    fs: &dyn FileSystem,
    options: &LocatorOptions,
    logger: &dyn Logger,
) -> Result<LocatedFiles> {
    let matcher = build_matcher(fs, options)?;
    let pattern = options
        .locale_pattern
        .as_deref()
        .map(compile_locale_pattern)
        .transpose()?;
    let strategies = default_strategies(pattern);
    let hints = options.hints();

    let mut located = LocatedFiles::default();
    for locale in &options.output_locales {
        located.target_files_by_locale.entry(locale.clone()).or_default();
    }

    for path in fs.list_files(&options.base_dir)? {
        let relative = relative_path(&options.base_dir, &path);
        if !matcher.matched(&relative, false).is_whitelist() {
            continue;
        }
        let Some(format) = FileFormat::from_path(&path) else {
            continue;
        };

        let locale_match = match detect_locale(&strategies, &relative, &hints) {
            Some(found) => found,
            // A template carries no locale; it stands in for the source
            None if format == FileFormat::Pot => LocaleMatch {
                locale: options.source_locale.clone(),
                template: relative.clone(),
            },
            None => {
                if options.verbose {
                    logger.log(&format!("Skipping {}: no locale detected", relative));
                }
                continue;
            }
        };

        let content = match fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                logger.warn(&format!("Could not read {}: {}", path.display(), e));
                located.errors.push(DiscoveryError::Unreadable {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let file = match load_translation_file(
            &path,
            &content,
            format,
            &locale_match,
            &options.source_locale,
            logger,
        ) {
            Ok(file) => file,
            Err(e) => {
                logger.warn(&format!("Skipping {}: {}", path.display(), e));
                located.errors.push(DiscoveryError::ParseFailed {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if file.locale == options.source_locale {
            located.source_files.push(file.clone());
        } else if let Some(targets) = located.target_files_by_locale.get_mut(&file.locale) {
            targets.push(file.clone());
        }
        located.all_files.push(file);
    }

    Ok(located)
}

/// Parse one file's content into a [`TranslationFile`]
pub fn load_translation_file(
    path: &Path,
    content: &str,
    format: FileFormat,
    locale_match: &LocaleMatch,
    source_locale: &str,
    logger: &dyn Logger,
) -> Result<TranslationFile> {
    let locale = locale_match.locale.clone();
    let (keys, has_language_wrapper, structure) = match format {
        FileFormat::Json | FileFormat::Yml => {
            let tree = if format == FileFormat::Json {
                JsonParser::parse_str(content, path)?
            } else {
                YamlParser::parse_str(content, path)?
            };
            let (inner, wrapped) = unwrap_language(tree, &locale);
            let flat = flatten_strict(&inner).unwrap_or_else(|e| {
                logger.warn(&format!("{}: {}; the nested value is used", path.display(), e));
                flatten(&inner)
            });
            (entries_from_flat(&flat), wrapped, detect_format(&inner))
        }
        FileFormat::Po | FileFormat::Pot => {
            let po_file = parse_po_file(content)?;
            let languages = PoLanguages::new(source_locale, locale.as_str());
            let keys = po_entries_to_api_format(&po_file.entries, Some(&languages));
            (keys, false, StructureFormat::Flat)
        }
    };

    Ok(TranslationFile {
        path: path.to_path_buf(),
        format,
        locale,
        namespace: namespace_of(&locale_match.template),
        has_language_wrapper,
        structure,
        locale_template: locale_match.template.clone(),
        keys,
    })
}

/// File stem of the template with the locale token removed:
/// `{locale}/common.json` → `common`, `{locale}.json` → none
pub fn namespace_of(template: &str) -> Option<String> {
    let name = template.rsplit('/').next().unwrap_or(template);
    let stem = match name.rfind('.') {
        Some(pos) => &name[..pos],
        None => name,
    };
    let namespace = stem
        .replace(LOCALE_PLACEHOLDER, "")
        .trim_matches(['.', '-', '_'])
        .to_string();
    (!namespace.is_empty()).then_some(namespace)
}

/// `/`-separated path of `path` below `base_dir`
pub fn relative_path(base_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Include globs whitelist, exclusions (defaults for the project type plus
/// the configured ones) win over them
fn build_matcher(fs: &dyn FileSystem, options: &LocatorOptions) -> Result<Override> {
    let mut builder = OverrideBuilder::new(&options.base_dir);
    let include = if options.include.is_empty() {
        crate::config::default_include_globs()
    } else {
        options.include.clone()
    };
    for glob in &include {
        builder
            .add(glob)
            .map_err(|e| SyncError::invalid_pattern(glob.as_str(), e))?;
    }

    let project_type = detect_project_type(fs, &options.base_dir);
    let exclusions = exclusion_globs(project_type)
        .into_iter()
        .chain(options.exclude.iter().cloned());
    for glob in exclusions {
        let negated = format!("!{}", glob.trim_start_matches('!'));
        builder
            .add(&negated)
            .map_err(|e| SyncError::invalid_pattern(glob.as_str(), e))?;
    }

    builder
        .build()
        .map_err(|e| SyncError::invalid_pattern(include.join(", "), e))
}
