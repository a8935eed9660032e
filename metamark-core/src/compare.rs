//! Field-by-field metadata comparison.
//!
//! Comparison answers "did the metadata change between these two files" and
//! attaches a coarse category to each difference so an operator can see at a
//! glance whether the timestamp, the device, the software or the location
//! story changed. A clean report says nothing about pixel integrity.

use std::path::Path;

use serde::Serialize;

use crate::exif::{read_metadata, MetadataRecord, Tag};
use crate::watermark::WATERMARK_TAG;

/// Coarse classification of a metadata difference, first matching rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffCategory {
    Timestamp,
    Device,
    Software,
    Location,
    Generic,
}

impl DiffCategory {
    pub fn for_tag(tag: Tag) -> DiffCategory {
        let name = tag.name();
        if name.to_ascii_lowercase().starts_with("date") {
            DiffCategory::Timestamp
        } else if tag == Tag::Make || tag == Tag::Model {
            DiffCategory::Device
        } else if tag == Tag::Software {
            DiffCategory::Software
        } else if name.contains("GPS") {
            DiffCategory::Location
        } else {
            DiffCategory::Generic
        }
    }

    /// Operator-facing reading of what a difference in this category means.
    pub fn explanation(&self) -> &'static str {
        match self {
            DiffCategory::Timestamp => {
                "capture timestamp differs, shooting time may have been forged"
            }
            DiffCategory::Device => {
                "device make or model differs, file may come from another camera"
            }
            DiffCategory::Software => {
                "editing software differs, the image may have been post-processed"
            }
            DiffCategory::Location => {
                "GPS data differs, location info may have been altered or stripped"
            }
            DiffCategory::Generic => "metadata value differs",
        }
    }
}

/// One differing field. A `None` side means the field is absent there.
#[derive(Debug, Clone, Serialize)]
pub struct DiffEntry {
    pub field: String,
    pub original: Option<String>,
    pub suspect: Option<String>,
    pub category: DiffCategory,
}

impl DiffEntry {
    pub fn explanation(&self) -> &'static str {
        self.category.explanation()
    }
}

/// Every differing field between an original and a suspect file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComparisonReport {
    pub entries: Vec<DiffEntry>,
}

impl ComparisonReport {
    pub fn has_differences(&self) -> bool {
        !self.entries.is_empty()
    }
}

/// Compare the metadata of two files.
///
/// Both sides degrade to the empty record when unreadable, so comparison
/// itself never fails; pair it with verification to catch the
/// everything-stripped case.
pub fn compare(original: impl AsRef<Path>, suspect: impl AsRef<Path>) -> ComparisonReport {
    compare_records(&read_metadata(original), &read_metadata(suspect))
}

/// Compare two records field by field.
///
/// The walk covers the union of both key sets, original insertion order
/// first, then suspect-only fields. The watermark field is excluded: it is
/// expected to differ and has its own verification path.
pub fn compare_records(
    original: &MetadataRecord,
    suspect: &MetadataRecord,
) -> ComparisonReport {
    let mut tags: Vec<Tag> = Vec::new();
    for (tag, _) in original.iter() {
        if tag != WATERMARK_TAG {
            tags.push(tag);
        }
    }
    for (tag, _) in suspect.iter() {
        if tag != WATERMARK_TAG && !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    let entries = tags
        .into_iter()
        .filter(|tag| original.get(*tag) != suspect.get(*tag))
        .map(|tag| DiffEntry {
            field: tag.name().into_owned(),
            original: original.get(tag).map(|v| v.to_string()),
            suspect: suspect.get(tag).map(|v| v.to_string()),
            category: DiffCategory::for_tag(tag),
        })
        .collect();
    ComparisonReport { entries }
}
