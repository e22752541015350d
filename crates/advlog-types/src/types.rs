//! Field, report and device records.
//!
//! A [`Field`] is one decoded piece of an advertisement. Fields are grouped
//! into a [`Report`] per observation, and reports sharing a key value are
//! merged into a cumulative [`Device`].

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One decoded field with ordered detail lines.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Field {
    /// Field name, used as its identity when merging.
    pub name: String,
    /// Primary value.
    pub value: String,
    /// Ordered sub-detail lines (flag bits, list entries, vendor records).
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub info: Vec<String>,
}

impl Field {
    /// Create a field with no info lines.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            info: Vec::new(),
        }
    }

    /// Builder-style info line append.
    #[must_use]
    pub fn with_info(mut self, line: impl Into<String>) -> Self {
        self.info.push(line.into());
        self
    }

    /// Append an info line.
    pub fn push_info(&mut self, line: impl Into<String>) {
        self.info.push(line.into());
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Insertion-ordered list of fields.
///
/// [`upsert`](Self::upsert) keeps names unique, replacing in place.
/// [`append`](Self::append) always pushes, so history can accumulate under
/// the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldList {
    fields: Vec<Field>,
}

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the first field with the same name, or append if absent.
    ///
    /// Returns the replaced field, if any.
    pub fn upsert(&mut self, field: Field) -> Option<Field> {
        match self.position(&field.name) {
            Some(index) => Some(std::mem::replace(&mut self.fields[index], field)),
            None => {
                self.fields.push(field);
                None
            }
        }
    }

    /// Append unconditionally, even if a field with the same name exists.
    pub fn append(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// First field with exactly this name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields with exactly this name, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |f| f.name == name)
    }

    /// Whether any field has this name.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Most recently added field.
    pub fn last_mut(&mut self) -> Option<&mut Field> {
        self.fields.last_mut()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl IntoIterator for FieldList {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl FromIterator<Field> for FieldList {
    /// Collect with upsert semantics, so the result has unique names.
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        let mut list = FieldList::new();
        for field in iter {
            list.upsert(field);
        }
        list
    }
}

/// One observation of a device at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Report {
    /// Seconds since capture start.
    pub timestamp: u64,
    pub fields: FieldList,
}

impl Report {
    pub fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            fields: FieldList::new(),
        }
    }

    /// Insert a field; a second field with the same name replaces the first.
    pub fn insert(&mut self, field: Field) {
        self.fields.upsert(field);
    }

    /// Look up a field by exact name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }
}

/// Cumulative view of every report sharing one key value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Device {
    /// Value of the key field that identifies this device.
    pub key: String,
    /// Number of reports merged into this device.
    pub observation_count: u32,
    /// Timestamp of every merged report, in merge order.
    pub encounter_timestamps: Vec<u64>,
    pub fields: FieldList,
}

impl Device {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut list = FieldList::new();
        list.upsert(Field::new("A", "1"));
        list.upsert(Field::new("B", "1"));
        let old = list.upsert(Field::new("A", "2"));

        assert_eq!(old.map(|f| f.value), Some("1".to_string()));
        let names: Vec<_> = list.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(list.get("A").unwrap().value, "2");
    }

    #[test]
    fn test_append_keeps_duplicates() {
        let mut list = FieldList::new();
        list.append(Field::new("Flags", "0x01"));
        list.append(Field::new("Flags", "0x02"));

        assert_eq!(list.len(), 2);
        let values: Vec<_> = list.get_all("Flags").map(|f| f.value.as_str()).collect();
        assert_eq!(values, ["0x01", "0x02"]);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut list = FieldList::new();
        list.upsert(Field::new("flags", "a"));
        list.upsert(Field::new("Flags", "b"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_report_insert_is_unique_by_name() {
        let mut report = Report::new(7);
        report.insert(Field::new("RSSI", "-40 dBm"));
        report.insert(Field::new("RSSI", "-41 dBm"));
        assert_eq!(report.fields.len(), 1);
        assert_eq!(report.field("RSSI").unwrap().value, "-41 dBm");
    }

    #[test]
    fn test_collect_upserts() {
        let list: FieldList = [Field::new("A", "1"), Field::new("A", "2")]
            .into_iter()
            .collect();
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("A").unwrap().value, "2");
    }

    #[test]
    fn test_field_builder_and_display() {
        let field = Field::new("Flags", "0x06")
            .with_info("LE General Discoverable Mode")
            .with_info("BR/EDR Not Supported");
        assert_eq!(field.to_string(), "Flags: 0x06");
        assert_eq!(field.info.len(), 2);
    }
}
