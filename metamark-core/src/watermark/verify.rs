use std::path::Path;

use serde::Serialize;

use crate::exif::{read_metadata, MetadataRecord, Tag};
use crate::features::missing_critical_fields;

use super::WATERMARK_TAG;

/// Outcome of a watermark check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "identity", rename_all = "snake_case")]
pub enum WatermarkStatus {
    /// The watermark field is unset.
    Absent,
    /// The watermark field equals the expected identity.
    Matches,
    /// The watermark field holds someone else's identity.
    Foreign(String),
}

/// Result of verifying one file.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub status: WatermarkStatus,
    /// Critical fields absent from the record, in feature order. A separate
    /// signal from the watermark itself: a matching watermark with missing
    /// critical fields is still reported.
    pub missing_critical: Vec<Tag>,
    pub record: MetadataRecord,
}

/// Check whether `path` carries `expected` in the watermark field.
///
/// The comparison is on rendered text, byte-exact and case-sensitive. Never
/// fails: unreadable metadata degrades to the empty record, which reports
/// `Absent` with every critical field missing.
pub fn verify(path: impl AsRef<Path>, expected: &str) -> VerificationReport {
    let record = read_metadata(path);
    let status = match record.get(WATERMARK_TAG) {
        None => WatermarkStatus::Absent,
        Some(value) => {
            let actual = value.to_string();
            if actual == expected {
                WatermarkStatus::Matches
            } else {
                WatermarkStatus::Foreign(actual)
            }
        }
    };
    VerificationReport {
        status,
        missing_critical: missing_critical_fields(&record),
        record,
    }
}
