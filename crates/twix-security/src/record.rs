//! Match record: original values extracted from one header

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key of the derived exam date entry.
pub const EXAM_DATE: &str = "Exam_date";

/// Field name → original value, in insertion order.
///
/// Insertion order is catalog order (with `Exam_date` first), which keeps
/// record table columns stable across files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchRecord {
    entries: Vec<(String, String)>,
}

impl MatchRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; an existing entry for `name` is replaced in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn exam_date(&self) -> Option<&str> {
        self.get(EXAM_DATE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for MatchRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Decode header bytes one byte per character (ISO-8859-1).
///
/// Every byte maps to exactly one `char`, so lengths and offsets carry over
/// unchanged between the byte buffer and the decoded string.
pub fn latin1_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut record = MatchRecord::new();
        record.insert(EXAM_DATE, "2023-06-15");
        record.insert("Patient_id", "123");
        record.insert("Patient_name", "Doe");

        let keys: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![EXAM_DATE, "Patient_id", "Patient_name"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut record = MatchRecord::new();
        record.insert("TR", "1");
        record.insert("TR", "2");
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("TR"), Some("2"));
    }

    #[test]
    fn test_serializes_as_map() {
        let mut record = MatchRecord::new();
        record.insert(EXAM_DATE, "2023-06-15");
        record.insert("TR", "2000.0");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Exam_date":"2023-06-15","TR":"2000.0"}"#);
    }

    #[test]
    fn test_latin1_string() {
        let s = latin1_string(b"M\xfcller");
        assert_eq!(s, "Müller");
        assert_eq!(s.chars().count(), 6);
    }
}
