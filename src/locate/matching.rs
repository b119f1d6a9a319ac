use crate::parse::{FileFormat, TranslationFile};
use std::path::{Path, PathBuf};

use super::strategy::LOCALE_PLACEHOLDER;

/// Find the target file paired with `source` among `candidates`.
///
/// Paths must be identical once the locale is replaced by `{locale}`, so a
/// file of the same name at another depth never pairs up. A `.pot` template
/// instead pairs with a `.po` file of the same stem anywhere, or with
/// `<locale>.po` beside it.
pub fn find_target_file<'a>(
    source: &TranslationFile,
    locale: &str,
    candidates: &'a [TranslationFile],
) -> Option<&'a TranslationFile> {
    let candidates = candidates.iter().filter(|c| c.locale == locale);

    if source.format == FileFormat::Pot {
        let stem = file_stem(&source.path);
        let beside = source.path.with_file_name(format!("{}.po", locale));
        let mut fallback = None;
        for candidate in candidates.filter(|c| c.format == FileFormat::Po) {
            if file_stem(&candidate.path) == stem {
                return Some(candidate);
            }
            if candidate.path == beside {
                fallback = Some(candidate);
            }
        }
        return fallback;
    }

    candidates
        .filter(|c| c.format == source.format)
        .find(|c| c.locale_template == source.locale_template)
}

/// Where the target file for `locale` belongs when it does not exist yet.
/// The discovery root is recovered from the source path and its template.
pub fn expected_target_path(source: &TranslationFile, locale: &str) -> PathBuf {
    if source.format == FileFormat::Pot {
        return source.path.with_file_name(format!("{}.po", locale));
    }
    let mut base_dir = source.path.clone();
    for _ in source.locale_template.split('/') {
        base_dir.pop();
    }
    base_dir.join(source.locale_template.replace(LOCALE_PLACEHOLDER, locale))
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
