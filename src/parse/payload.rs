use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Previous identity of a key, used to rename entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldValue {
    pub key: String,
}

/// One translated key as returned by the translation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub key: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub old_values: Vec<OldValue>,
}

impl TranslationRecord {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            old_values: Vec::new(),
        }
    }

    pub fn with_old_key(mut self, old_key: impl Into<String>) -> Self {
        self.old_values.push(OldValue { key: old_key.into() });
        self
    }

    /// Key this record replaces, if any
    pub fn old_key(&self) -> Option<&str> {
        self.old_values.first().map(|o| o.key.as_str())
    }
}

/// Translations coming back from the service: either a plain key → value
/// map or a list of records (needed for renames)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationPayload {
    Records(Vec<TranslationRecord>),
    Map(IndexMap<String, Value>),
}

impl Default for TranslationPayload {
    fn default() -> Self {
        Self::Map(IndexMap::new())
    }
}

impl TranslationPayload {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Records(records) => records.is_empty(),
            Self::Map(map) => map.is_empty(),
        }
    }

    /// Records in input order; map entries get no old values
    pub fn records(&self) -> Vec<TranslationRecord> {
        match self {
            Self::Records(records) => records.clone(),
            Self::Map(map) => map
                .iter()
                .map(|(key, value)| TranslationRecord::new(key.clone(), value.clone()))
                .collect(),
        }
    }

    /// Flat key → value view; the last record for a key wins
    pub fn to_map(&self) -> IndexMap<String, Value> {
        match self {
            Self::Map(map) => map.clone(),
            Self::Records(records) => records
                .iter()
                .map(|r| (r.key.clone(), r.value.clone()))
                .collect(),
        }
    }
}

impl From<IndexMap<String, Value>> for TranslationPayload {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<TranslationRecord>> for TranslationPayload {
    fn from(records: Vec<TranslationRecord>) -> Self {
        Self::Records(records)
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for TranslationPayload {
    fn from(pairs: [(K, V); N]) -> Self {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
