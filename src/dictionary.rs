//! String-keyed value maps used for params, query strings, and headers.
//!
//! Every entry is a [`serde_json::Value`], so any entry can be turned into a
//! string with [`value_to_string`]. Later merges win on key collision.

use serde_json::Value;
use std::collections::btree_map::{self, BTreeMap};

/// An ordered mapping from string keys to JSON values.
///
/// # Examples
///
/// ```
/// use fetchwright::Dictionary;
///
/// let mut params = Dictionary::new().with("id", 7);
/// params.merge(&Dictionary::new().with("id", 8).with("page", 2));
///
/// assert_eq!(params.get("id"), Some(&serde_json::json!(8)));
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: BTreeMap<String, Value>,
}

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry and returns the dictionary, for chained construction.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts an entry, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Copies every entry of `other` into `self`; `other` wins on collision.
    pub fn merge(&mut self, other: &Dictionary) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Returns a new dictionary holding `self` overlaid with `other`.
    pub fn merged(&self, other: &Dictionary) -> Dictionary {
        let mut merged = self.clone();
        merged.merge(other);
        merged
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Returns a copy with every key lowercased.
    ///
    /// Header names are case-insensitive, so header dictionaries are stored
    /// in this form.
    pub(crate) fn lowercase_keys(&self) -> Dictionary {
        self.entries
            .iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), value.clone()))
            .collect()
    }

    /// Flattens the dictionary into query pairs.
    ///
    /// Arrays emit one pair per element, in order. Top-level `null`, `""` and
    /// `false` values are skipped; `0` is kept.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.entries {
            match value {
                Value::Array(items) => {
                    for item in items {
                        pairs.push((key.clone(), value_to_string(item)));
                    }
                }
                other if is_present(other) => {
                    pairs.push((key.clone(), value_to_string(other)));
                }
                _ => {}
            }
        }
        pairs
    }
}

impl<K, V> FromIterator<(K, V)> for Dictionary
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Converts a value to the string form used in URLs, paths and headers.
///
/// Arrays render as their elements joined with `,`; objects as JSON text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

// Only null, "" and false count as absent.
fn is_present(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
        && !matches!(value, Value::String(s) if s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_incoming_wins() {
        let mut base = Dictionary::new().with("a", 1).with("b", "old");
        base.merge(&Dictionary::new().with("b", "new").with("c", true));

        assert_eq!(base.get("a"), Some(&json!(1)));
        assert_eq!(base.get("b"), Some(&json!("new")));
        assert_eq!(base.get("c"), Some(&json!(true)));
    }

    #[test]
    fn test_merged_leaves_original_untouched() {
        let base = Dictionary::new().with("a", 1);
        let merged = base.merged(&Dictionary::new().with("a", 2));

        assert_eq!(base.get("a"), Some(&json!(1)));
        assert_eq!(merged.get("a"), Some(&json!(2)));
    }

    #[test]
    fn test_query_pairs_expand_arrays_in_order() {
        let query = Dictionary::new().with("item", json!([1, 2, 3]));
        let pairs = query.to_query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("item".to_string(), "1".to_string()),
                ("item".to_string(), "2".to_string()),
                ("item".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_keep_zero_skip_absent() {
        let query = Dictionary::new()
            .with("zero", 0)
            .with("null", Value::Null)
            .with("empty", "")
            .with("no", false)
            .with("yes", true);
        let pairs = query.to_query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("yes".to_string(), "true".to_string()),
                ("zero".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_emit_every_array_element() {
        let query = Dictionary::new().with("flag", json!([false, "", null, 0]));
        let values: Vec<String> = query
            .to_query_pairs()
            .into_iter()
            .map(|(_, value)| value)
            .collect();

        assert_eq!(values, vec!["false", "", "null", "0"]);
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("text")), "text");
        assert_eq!(value_to_string(&json!(1.5)), "1.5");
        assert_eq!(value_to_string(&json!(null)), "null");
        assert_eq!(value_to_string(&json!([1, "a"])), "1,a");
        assert_eq!(value_to_string(&json!({"k": 1})), r#"{"k":1}"#);
    }

    #[test]
    fn test_lowercase_keys() {
        let headers = Dictionary::new().with("Content-Type", "text/plain");
        let lowered = headers.lowercase_keys();

        assert!(lowered.contains_key("content-type"));
        assert!(!lowered.contains_key("Content-Type"));
    }
}
