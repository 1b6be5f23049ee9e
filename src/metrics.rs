//! Flat result mapping from metric name to value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered metric name → value mapping produced by a calculation.
///
/// Insertion order is preserved so output lists `ro` and `P0` first,
/// followed by the model-specific measures and any cost keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metrics {
    values: IndexMap<String, f64>,
}

impl Metrics {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a metric.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    /// Look up a metric.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Metric names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> IntoIterator for &'a Metrics {
    type Item = (&'a String, &'a f64);
    type IntoIter = indexmap::map::Iter<'a, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut metrics = Metrics::new();
        metrics.insert("ro", 0.4);
        metrics.insert("P0", 0.6);
        metrics.insert("L", 0.5);
        let keys: Vec<&str> = metrics.keys().collect();
        assert_eq!(keys, ["ro", "P0", "L"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut metrics = Metrics::new();
        metrics.insert("P0", 0.1);
        metrics.insert("P0", 0.2);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics.get("P0"), Some(0.2));
    }

    #[test]
    fn test_get_missing() {
        let metrics = Metrics::new();
        assert!(metrics.is_empty());
        assert_eq!(metrics.get("Pk"), None);
        assert!(!metrics.contains("Pk"));
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let mut metrics = Metrics::new();
        metrics.insert("ro", 0.4);
        metrics.insert("P0", 0.6);
        let json = serde_json::to_string(&metrics).unwrap();
        assert_eq!(json, r#"{"ro":0.4,"P0":0.6}"#);
    }

    #[test]
    fn test_iter_pairs() {
        let mut metrics = Metrics::new();
        metrics.insert("W", 1.5);
        let pairs: Vec<(&str, f64)> = metrics.iter().collect();
        assert_eq!(pairs, [("W", 1.5)]);
        assert_eq!((&metrics).into_iter().count(), 1);
    }
}
