use crate::error::{Result, SyncError};
use serde_json::{Map, Number, Value};
use std::path::Path;
use yaml_rust::{Yaml, YamlLoader};

/// Parser for YAML translation files
pub struct YamlParser;

impl YamlParser {
    /// Load the first document of `content` as a JSON-like tree.
    /// An empty document is an empty mapping.
    pub fn parse_str(content: &str, path: &Path) -> Result<Value> {
        let docs = YamlLoader::load_from_str(content)
            .map_err(|e| SyncError::yaml_parse(path, e.to_string()))?;

        match docs.into_iter().next() {
            Some(Yaml::Null) | None => Ok(Value::Object(Map::new())),
            Some(doc @ Yaml::Hash(_)) => Ok(Self::yaml_to_json(doc)),
            Some(_) => Err(SyncError::yaml_parse(
                path,
                "top level of a translation file must be a mapping",
            )),
        }
    }

    fn yaml_to_json(yaml: Yaml) -> Value {
        match yaml {
            Yaml::Hash(hash) => {
                let mut map = Map::new();
                for (key, value) in hash {
                    if let Some(key_str) = Self::key_to_string(&key) {
                        map.insert(key_str, Self::yaml_to_json(value));
                    }
                }
                Value::Object(map)
            }
            Yaml::Array(items) => Value::Array(items.into_iter().map(Self::yaml_to_json).collect()),
            Yaml::String(value) => Value::String(value),
            Yaml::Integer(value) => Value::Number(value.into()),
            Yaml::Real(raw) => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::String(raw)),
            Yaml::Boolean(value) => Value::Bool(value),
            Yaml::Null | Yaml::BadValue | Yaml::Alias(_) => Value::Null,
        }
    }

    fn key_to_string(key: &Yaml) -> Option<String> {
        match key {
            Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
            Yaml::Integer(i) => Some(i.to_string()),
            Yaml::Boolean(b) => Some(b.to_string()),
            Yaml::Null => Some("null".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested_yaml() {
        let tree = YamlParser::parse_str(
            "en:\n  greeting: \"Hello, %{name}!\"\n  count: 3\n  enabled: true\n",
            Path::new("en.yml"),
        )
        .unwrap();
        assert_eq!(
            tree,
            json!({"en": {"greeting": "Hello, %{name}!", "count": 3, "enabled": true}})
        );
    }

    #[test]
    fn test_parse_block_literal_and_sequence() {
        let tree = YamlParser::parse_str(
            "intro: |\n  line one\n\n  line three\ndays:\n  - Mon\n  - \"Tue: late\"\n",
            Path::new("en.yml"),
        )
        .unwrap();
        assert_eq!(tree["intro"], json!("line one\n\nline three\n"));
        assert_eq!(tree["days"], json!(["Mon", "Tue: late"]));
    }

    #[test]
    fn test_parse_empty_document() {
        let tree = YamlParser::parse_str("# only a comment\n", Path::new("fr.yml")).unwrap();
        assert_eq!(tree, json!({}));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = YamlParser::parse_str("key: [unclosed", Path::new("bad.yml")).unwrap_err();
        assert!(err.to_string().contains("bad.yml"));
        assert!(YamlParser::parse_str("- a\n- b\n", Path::new("list.yml")).is_err());
    }
}
