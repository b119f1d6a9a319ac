use crate::error::{Result, SyncError};
use crate::fs::FileSystem;
use crate::keys::{
    detect_format, find_existing_segments, get_path, insert_path, key_segments, remove_path,
    CollisionPolicy, FlatMap,
};
use crate::logger::Logger;
use crate::parse::YamlParser;
use serde_json::{Map, Value};
use std::path::Path;

use super::{inner_tree, is_empty_object, wrap, wrapper_key, SourceDocument, UpdateOptions, YamlDocument};

/// New text of the YAML file at `path`, or `None` when nothing changes
pub(super) fn updated_text(
    fs: &dyn FileSystem,
    path: &Path,
    updates: &FlatMap,
    options: &UpdateOptions,
    logger: &dyn Logger,
) -> Result<Option<String>> {
    let original = if fs.exists(path) {
        Some(fs.read_to_string(path)?)
    } else {
        None
    };

    let (tree, mut doc, wrapper, source) = match &original {
        Some(text) => {
            let tree = YamlParser::parse_str(text, path)?;
            let doc = editable_document(text, &tree, path, logger);
            let wrapper = wrapper_key(&tree, options.locale.as_deref());
            let source = if is_empty_object(&inner_tree(&tree, wrapper.as_deref())) {
                SourceDocument::read(fs, options)?
            } else {
                None
            };
            (tree, doc, wrapper, source)
        }
        None => {
            let source = SourceDocument::read(fs, options)?;
            let wrapper = match &source {
                Some(source) => source.target_wrapper(path, options)?,
                None => None,
            };
            let tree = wrap(Value::Object(Map::new()), wrapper.as_deref());
            (tree.clone(), YamlDocument::from_value(&tree), wrapper, source)
        }
    };

    let inner = inner_tree(&tree, wrapper.as_deref());
    let (reference, mode) = match &source {
        Some(source) => (&source.inner, source.mode),
        None => (&inner, detect_format(&inner)),
    };

    let prefix: Vec<String> = wrapper.iter().cloned().collect();
    let mut expected = tree.clone();
    for (key, value) in updates {
        let segments = find_existing_segments(&inner, key)
            .unwrap_or_else(|| key_segments(reference, key, mode));
        let full: Vec<String> = prefix.iter().cloned().chain(segments).collect();
        if get_path(&expected, &full) == Some(value) {
            continue;
        }

        if let Some(root) = expected.as_object_mut() {
            insert_path(root, key, &full, value.clone(), CollisionPolicy::Overwrite)?;
        }
        if let Some(depth) = doc.set(&full, value) {
            // A flow or scalar parent was replaced; write it out in full
            let parent = &full[..=depth];
            if let Some(contents) = get_path(&expected, parent) {
                doc.set(parent, contents);
            }
        }
    }

    let rendered = doc.render();
    if original.as_deref() == Some(rendered.as_str()) {
        return Ok(None);
    }
    verify(&rendered, &expected, path)?;
    Ok(Some(rendered))
}

/// `original` without `keys`, plus the keys that were removed
pub(super) fn without_keys(
    original: &str,
    path: &Path,
    keys: &[String],
    locale: Option<&str>,
    logger: &dyn Logger,
) -> Result<(String, Vec<String>)> {
    let tree = YamlParser::parse_str(original, path)?;
    let mut doc = editable_document(original, &tree, path, logger);
    let wrapper = wrapper_key(&tree, locale);
    let prefix: Vec<String> = wrapper.iter().cloned().collect();

    let mut expected = tree.clone();
    let mut deleted = Vec::new();
    for key in keys {
        let inner = match expected_inner_mut(&mut expected, wrapper.as_deref()) {
            Some(inner) => inner,
            None => break,
        };
        let Some(segments) = find_existing_segments(&Value::Object(inner.clone()), key) else {
            continue;
        };
        if remove_path(inner, &segments).is_none() {
            continue;
        }
        let full: Vec<String> = prefix.iter().cloned().chain(segments).collect();
        doc.remove(&full, prefix.len());
        deleted.push(key.clone());
    }

    if deleted.is_empty() {
        return Ok((original.to_string(), deleted));
    }
    let rendered = doc.render();
    verify(&rendered, &expected, path)?;
    Ok((rendered, deleted))
}

fn expected_inner_mut<'a>(tree: &'a mut Value, wrapper: Option<&str>) -> Option<&'a mut Map<String, Value>> {
    match wrapper {
        Some(key) => tree.get_mut(key)?.as_object_mut(),
        None => tree.as_object_mut(),
    }
}

/// The line model of `text`, or a fresh rendering of `tree` when the text
/// uses constructs the model cannot edit in place
fn editable_document(text: &str, tree: &Value, path: &Path, logger: &dyn Logger) -> YamlDocument {
    YamlDocument::parse(text).unwrap_or_else(|reason| {
        logger.warn(&format!(
            "{}: {}; the file will be rewritten in block style",
            path.display(),
            reason
        ));
        YamlDocument::from_value(tree)
    })
}

/// Reload the rendered text; it must parse and hold exactly `expected`
fn verify(rendered: &str, expected: &Value, path: &Path) -> Result<()> {
    let reloaded = YamlParser::parse_str(rendered, path)?;
    if &reloaded != expected {
        return Err(SyncError::yaml_parse(
            path,
            "the updated document does not read back as the requested content; nothing was written",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::logger::SilentLogger;
    use serde_json::json;

    fn updates(pairs: &[(&str, Value)]) -> FlatMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn run(fs: &MemoryFileSystem, path: &str, pairs: &[(&str, Value)], options: &UpdateOptions) -> Option<String> {
        updated_text(fs, Path::new(path), &updates(pairs), options, &SilentLogger).unwrap()
    }

    #[test]
    fn test_double_quotes_survive_update() {
        let fs = MemoryFileSystem::new().with_file(
            "/app/config/locales/fr.yml",
            "fr:\n  # Shown on the dashboard\n  greeting: \"Hi, %{name}!\"\n  farewell: Bye\n",
        );
        let text = run(
            &fs,
            "/app/config/locales/fr.yml",
            &[("greeting", json!("Salut, %{name} !"))],
            &UpdateOptions::new().with_locale("fr"),
        )
        .unwrap();
        assert_eq!(
            text,
            "fr:\n  # Shown on the dashboard\n  greeting: \"Salut, %{name} !\"\n  farewell: Bye\n"
        );
    }

    #[test]
    fn test_new_keys_follow_existing_nesting() {
        let fs = MemoryFileSystem::new().with_file("/app/fr.yml", "fr:\n  home:\n    title: Accueil\n");
        let text = run(
            &fs,
            "/app/fr.yml",
            &[("home.subtitle", json!("Bienvenue")), ("nav.back", json!("Retour"))],
            &UpdateOptions::new().with_locale("fr"),
        )
        .unwrap();
        assert_eq!(
            text,
            "fr:\n  home:\n    title: Accueil\n    subtitle: Bienvenue\n  nav:\n    back: Retour\n"
        );
    }

    #[test]
    fn test_unchanged_values_write_nothing() {
        let fs = MemoryFileSystem::new().with_file("/app/fr.yml", "fr:\n  a: 'A'\n");
        let result = run(&fs, "/app/fr.yml", &[("a", json!("A"))], &UpdateOptions::new());
        assert!(result.is_none());
    }

    #[test]
    fn test_new_file_mirrors_source_wrapper() {
        let fs = MemoryFileSystem::new().with_file("/app/en.yml", "en:\n  home:\n    title: Home\n");
        let text = run(
            &fs,
            "/app/de.yml",
            &[("home.title", json!("Startseite")), ("tags", json!(["a", "b: c"]))],
            &UpdateOptions::new().with_locale("de").with_source("/app/en.yml", "en"),
        )
        .unwrap();
        assert_eq!(
            text,
            "de:\n  home:\n    title: Startseite\n  tags:\n    - a\n    - \"b: c\"\n"
        );
    }

    #[test]
    fn test_flow_parent_is_rewritten_in_full() {
        let fs = MemoryFileSystem::new().with_file("/app/fr.yml", "errors: {a: A}\n");
        let text = run(&fs, "/app/fr.yml", &[("errors.b", json!("B"))], &UpdateOptions::new()).unwrap();
        assert_eq!(text, "errors:\n  a: A\n  b: B\n");
    }

    #[test]
    fn test_without_keys_prunes_and_keeps_comments() {
        let original = "# Managed by hand\nfr:\n  home:\n    title: Accueil\n  ok: OK\n";
        let (text, deleted) = without_keys(
            original,
            Path::new("fr.yml"),
            &["home.title".to_string(), "nope".to_string()],
            Some("fr"),
            &SilentLogger,
        )
        .unwrap();
        assert_eq!(deleted, vec!["home.title".to_string()]);
        assert_eq!(text, "# Managed by hand\nfr:\n  ok: OK\n");
    }

    #[test]
    fn test_empty_locale_wrapper_receives_keys() {
        let fs = MemoryFileSystem::new().with_file("/app/fr.yml", "fr:\n");
        let text = run(
            &fs,
            "/app/fr.yml",
            &[("home.title", json!("Accueil"))],
            &UpdateOptions::new().with_locale("fr"),
        )
        .unwrap();
        assert_eq!(text, "fr:\n  home:\n    title: Accueil\n");
    }

    #[test]
    fn test_null_locale_wrapper_is_detected_without_locale() {
        let fs = MemoryFileSystem::new().with_file("/app/fr.yml", "# French\nfr: ~\n");
        let text = run(&fs, "/app/fr.yml", &[("ok", json!("OK"))], &UpdateOptions::new()).unwrap();
        assert!(text.starts_with("# French\n"));
        assert_eq!(
            YamlParser::parse_str(&text, Path::new("fr.yml")).unwrap(),
            json!({"fr": {"ok": "OK"}})
        );
    }
}
