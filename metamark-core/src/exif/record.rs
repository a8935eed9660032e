//! The ordered metadata record.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::tag::Tag;
use super::value::Value;

/// An ordered collection of decoded metadata fields.
///
/// Iteration preserves insertion order, which follows the on-disk directory
/// order when a record comes from a decoded file. Equality ignores order so
/// that records with the same fields compare equal regardless of how they
/// were assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    entries: IndexMap<Tag, Value>,
}

impl MetadataRecord {
    pub fn new() -> MetadataRecord {
        MetadataRecord::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (Tag, Value)>) -> MetadataRecord {
        MetadataRecord {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, tag: Tag) -> Option<&Value> {
        self.entries.get(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.entries.contains_key(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, &Value)> {
        self.entries.iter().map(|(tag, value)| (*tag, value))
    }

    /// Copy of this record with `tag` set to `value`.
    ///
    /// An existing entry keeps its position; a new entry appends at the end.
    pub fn with_value(&self, tag: Tag, value: Value) -> MetadataRecord {
        let mut entries = self.entries.clone();
        entries.insert(tag, value);
        MetadataRecord { entries }
    }

    pub(crate) fn insert(&mut self, tag: Tag, value: Value) {
        self.entries.insert(tag, value);
    }
}

impl Serialize for MetadataRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (tag, value) in &self.entries {
            map.serialize_entry(&tag.name(), &value.to_string())?;
        }
        map.end()
    }
}
