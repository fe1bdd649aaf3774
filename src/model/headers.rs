//! Ordered header mapping with case-insensitive lookup.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered mapping from header name to a single value.
///
/// Names keep their original case for display but every lookup ignores
/// case. A repeated header does not create a second entry: the later value
/// replaces the earlier one in place, so insertion order is that of the
/// first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any existing value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a header value by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    /// Look up a header and return its stored name together with the value.
    pub fn get_entry(&self, name: &str) -> Option<(&str, &str)> {
        self.position(name)
            .map(|idx| (self.entries[idx].0.as_str(), self.entries[idx].1.as_str()))
    }

    /// Mutable access to a header value, used while folding continuation lines.
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut String> {
        self.position(name).map(|idx| &mut self.entries[idx].1)
    }

    /// Whether a header with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of distinct headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no header has been stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Serialized as an ordered JSON object.
impl Serialize for HeaderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "text/plain");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(headers.get_entry("content-TYPE"), Some(("Content-Type", "text/plain")));
    }

    #[test]
    fn test_last_occurrence_wins_in_place() {
        let mut headers = HeaderMap::new();
        headers.insert("Received", "first");
        headers.insert("Subject", "Hi");
        headers.insert("received", "second");
        assert_eq!(headers.len(), 2);
        let names: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["received", "Subject"]);
        assert_eq!(headers.get("Received"), Some("second"));
    }

    #[test]
    fn test_empty_map() {
        let headers = HeaderMap::new();
        assert!(headers.is_empty());
        assert_eq!(headers.get("From"), None);
        assert!(!headers.contains("From"));
    }

    #[test]
    fn test_serializes_in_order() {
        let headers: HeaderMap = [("Subject", "Hi"), ("From", "a@b.com")].into_iter().collect();
        let json = serde_json::to_string(&headers).unwrap();
        assert_eq!(json, r#"{"Subject":"Hi","From":"a@b.com"}"#);
    }
}
