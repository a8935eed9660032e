//! Feature extraction for tamper classification.
//!
//! The model sees a file as a fixed-width presence vector over the critical
//! fields. Values do not enter the vector; removing or blanking a field is
//! what tampering tools overwhelmingly do, and presence alone keeps the
//! feature space identical at training and inference time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::exif::{read_metadata, MetadataRecord, Tag};

/// Fields whose presence the classifier reasons about, in feature order.
pub const CRITICAL_FIELDS: [Tag; 5] = [
    Tag::DateTime,
    Tag::Make,
    Tag::Model,
    Tag::Software,
    Tag::GpsInfo,
];

/// Feature names in vector order, as stored alongside a trained model.
pub fn feature_names() -> Vec<String> {
    CRITICAL_FIELDS
        .iter()
        .map(|tag| tag.name().into_owned())
        .collect()
}

/// Fixed-width presence vector over [`CRITICAL_FIELDS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn new(values: Vec<f32>) -> FeatureVector {
        FeatureVector(values)
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}]", rendered.join(", "))
    }
}

/// Presence vector of a record.
pub fn vectorize_record(record: &MetadataRecord) -> FeatureVector {
    FeatureVector::new(
        CRITICAL_FIELDS
            .iter()
            .map(|tag| if record.contains(*tag) { 1.0 } else { 0.0 })
            .collect(),
    )
}

/// Presence vector of a file on disk. Unreadable files vectorize as all
/// absent, like any other file without metadata.
pub fn vectorize_file(path: impl AsRef<std::path::Path>) -> FeatureVector {
    vectorize_record(&read_metadata(path))
}

/// Critical fields absent from a record, in feature order.
pub fn missing_critical_fields(record: &MetadataRecord) -> Vec<Tag> {
    CRITICAL_FIELDS
        .iter()
        .copied()
        .filter(|tag| !record.contains(*tag))
        .collect()
}
