//! Locale detection for translation file paths.
//!
//! Strategies are tried in order and the first hit wins: a directory named
//! after a configured locale, then file name tokens, then a user pattern,
//! and only then any directory that merely looks like a locale.

use crate::config::is_valid_locale;
use regex::Regex;

/// Placeholder for the locale inside a path template
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

#[derive(Debug, Clone)]
pub enum LocaleStrategy {
    /// A directory named after a hinted locale: `locales/fr/common.json`
    DirectorySegment,
    /// A token of the file name: `fr.json`, `common.pt-BR.yml`, `app-de.po`
    FilenameToken,
    /// Capture group `locale` (or group 1) of a user regex, matched against
    /// the relative path with `/` separators
    Pattern(Regex),
    /// Any directory named like a valid locale code; `ui/` and `js/` qualify,
    /// so this only runs when nothing else matched
    AnyDirectory,
}

/// A detected locale and the path with that locale replaced by `{locale}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleMatch {
    pub locale: String,
    pub template: String,
}

impl LocaleStrategy {
    /// `relative` uses `/` separators. `hints` are the configured locales;
    /// a hinted locale is returned in its configured spelling.
    pub fn detect(&self, relative: &str, hints: &[String]) -> Option<LocaleMatch> {
        match self {
            Self::DirectorySegment => detect_directory(relative, |segment| hinted(segment, hints)),
            Self::FilenameToken => detect_filename(relative, hints),
            Self::Pattern(regex) => detect_pattern(regex, relative, hints),
            Self::AnyDirectory => detect_directory(relative, |segment| canonical(segment, hints)),
        }
    }
}

/// Hinted directories and file names, the user pattern if any, then
/// unhinted directories
pub fn default_strategies(pattern: Option<Regex>) -> Vec<LocaleStrategy> {
    let mut strategies = vec![LocaleStrategy::DirectorySegment, LocaleStrategy::FilenameToken];
    strategies.extend(pattern.map(LocaleStrategy::Pattern));
    strategies.push(LocaleStrategy::AnyDirectory);
    strategies
}

pub fn detect_locale(
    strategies: &[LocaleStrategy],
    relative: &str,
    hints: &[String],
) -> Option<LocaleMatch> {
    strategies.iter().find_map(|s| s.detect(relative, hints))
}

/// Hinted spelling of `candidate`; without a hint, the candidate itself if
/// it is a valid locale
fn canonical(candidate: &str, hints: &[String]) -> Option<String> {
    hints
        .iter()
        .find(|hint| hint.eq_ignore_ascii_case(candidate))
        .cloned()
        .or_else(|| is_valid_locale(candidate).then(|| candidate.to_string()))
}

/// Configured spelling of `candidate` when it is one of the hints
fn hinted(candidate: &str, hints: &[String]) -> Option<String> {
    hints
        .iter()
        .find(|hint| hint.eq_ignore_ascii_case(candidate))
        .cloned()
}

fn detect_directory(
    relative: &str,
    accept: impl Fn(&str) -> Option<String>,
) -> Option<LocaleMatch> {
    let segments: Vec<&str> = relative.split('/').collect();
    let (_, dirs) = segments.split_last()?;

    // Deepest directory first: `locales/fr/` beats an outer `js/`
    let (position, locale) = dirs
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, segment)| accept(segment).map(|locale| (i, locale)))?;

    let template = segments
        .iter()
        .enumerate()
        .map(|(i, s)| if i == position { LOCALE_PLACEHOLDER } else { *s })
        .collect::<Vec<_>>()
        .join("/");
    Some(LocaleMatch { locale, template })
}

fn detect_filename(relative: &str, hints: &[String]) -> Option<LocaleMatch> {
    let (dir, name) = match relative.rfind('/') {
        Some(pos) => (&relative[..=pos], &relative[pos + 1..]),
        None => ("", relative),
    };
    let stem_len = name.rfind('.').unwrap_or(name.len());
    let (start, end, locale) = find_locale_token(&name[..stem_len], hints)?;

    let template = format!("{}{}{}{}", dir, &name[..start], LOCALE_PLACEHOLDER, &name[end..]);
    Some(LocaleMatch { locale, template })
}

/// Locate an `xx` / `xx-XX` token bounded by `.`, `-` or the stem edges.
/// The token closest to the end wins; `xx-XX` is preferred over `XX`.
fn find_locale_token(stem: &str, hints: &[String]) -> Option<(usize, usize, String)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, ch) in stem.char_indices() {
        if ch == '.' || ch == '-' {
            pieces.push((start, i));
            start = i + 1;
        }
    }
    pieces.push((start, stem.len()));

    for i in (0..pieces.len()).rev() {
        if i > 0 {
            let (pair_start, _) = pieces[i - 1];
            let (_, pair_end) = pieces[i];
            let pair = &stem[pair_start..pair_end];
            if stem.as_bytes()[pieces[i].0 - 1] == b'-' {
                if let Some(locale) = canonical(pair, hints).filter(|l| l.contains('-')) {
                    return Some((pair_start, pair_end, locale));
                }
            }
        }
        let (s, e) = pieces[i];
        if let Some(locale) = canonical(&stem[s..e], hints) {
            return Some((s, e, locale));
        }
    }
    None
}

fn detect_pattern(regex: &Regex, relative: &str, hints: &[String]) -> Option<LocaleMatch> {
    let captures = regex.captures(relative)?;
    let group = captures.name("locale").or_else(|| captures.get(1))?;
    let locale = canonical(group.as_str(), hints)?;

    let template = format!(
        "{}{}{}",
        &relative[..group.start()],
        LOCALE_PLACEHOLDER,
        &relative[group.end()..]
    );
    Some(LocaleMatch { locale, template })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn detect(relative: &str, hint_list: &[&str]) -> Option<LocaleMatch> {
        detect_locale(&default_strategies(None), relative, &hints(hint_list))
    }

    #[test]
    fn test_directory_beats_filename() {
        let found = detect("locales/fr/en.json", &["en", "fr"]).unwrap();
        assert_eq!(found.locale, "fr");
        assert_eq!(found.template, "locales/{locale}/en.json");
    }

    #[test]
    fn test_unhinted_directory_loses_to_filename() {
        let found = detect("src/ui/locales/en.json", &["en"]).unwrap();
        assert_eq!(found.locale, "en");
        assert_eq!(found.template, "src/ui/locales/{locale}.json");

        let found = detect("src/ui/locales/fr.json", &["en"]).unwrap();
        assert_eq!(found.locale, "fr");
    }

    #[test]
    fn test_unhinted_directory_is_the_last_resort() {
        let found = detect("locales/fr/common.json", &["en"]).unwrap();
        assert_eq!(found.locale, "fr");
        assert_eq!(found.template, "locales/{locale}/common.json");

        let found = detect("js/locales/de/app.json", &["en"]).unwrap();
        assert_eq!(found.locale, "de");
    }

    #[test]
    fn test_directory_match_is_case_insensitive() {
        let found = detect("config/locales/PT-br/app.yml", &["en", "pt-BR"]).unwrap();
        assert_eq!(found.locale, "pt-BR");
        assert_eq!(found.template, "config/locales/{locale}/app.yml");
    }

    #[test]
    fn test_filename_tokens() {
        assert_eq!(detect("locales/en.json", &[]).unwrap().template, "locales/{locale}.json");

        let found = detect("i18n/common.pt-BR.yml", &[]).unwrap();
        assert_eq!(found.locale, "pt-BR");
        assert_eq!(found.template, "i18n/common.{locale}.yml");

        let found = detect("po/app-de.po", &["en", "de"]).unwrap();
        assert_eq!(found.locale, "de");
        assert_eq!(found.template, "po/app-{locale}.po");

        let found = detect("lang/messages-de-AT.json", &[]).unwrap();
        assert_eq!(found.locale, "de-AT");
        assert_eq!(found.template, "lang/messages-{locale}.json");
    }

    #[test]
    fn test_no_locale() {
        assert!(detect("locales/messages.pot", &[]).is_none());
        assert!(detect("src/settings.json", &["en", "fr"]).is_none());
        assert!(detect("locales/pt_BR.json", &[]).is_none());
    }

    #[test]
    fn test_pattern_strategy() {
        let regex = Regex::new(r"strings_(?P<locale>[a-z]{2})\.xml\.json$").unwrap();
        let strategies = vec![LocaleStrategy::Pattern(regex)];
        let found = detect_locale(&strategies, "res/strings_sv.xml.json", &[]).unwrap();
        assert_eq!(found.locale, "sv");
        assert_eq!(found.template, "res/strings_{locale}.xml.json");
    }
}
