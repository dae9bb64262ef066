use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An insertion-ordered `column label -> display string` mapping
///
/// Result tables have per-run column labels (the bit widths are part of the label, e.g.
/// `tag 12b`), so rows are dynamic maps rather than structs. Column order is part of the
/// output contract: serialization emits columns in insertion order, deserialization keeps
/// the order found in the document, and equality is order-sensitive
///
/// [`Row::set`] follows object-update semantics: an existing label is overwritten in place,
/// a new label is appended. Completing a partially-filled row therefore preserves the
/// caller's column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column, overwriting in place if the label already exists
    pub fn set(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(l, _)| *l == label) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over `(label, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (label, value) in &self.columns {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column labels to display strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((label, value)) = access.next_entry::<String, String>()? {
                    row.set(label, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}
