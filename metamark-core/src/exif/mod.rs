//! EXIF metadata codec for JPEG files.
//!
//! Reading is lossless and total: any file, readable or not, JPEG or not,
//! maps to a [`MetadataRecord`] (possibly empty). Writing rewrites only the
//! EXIF APP1 segment and leaves every other byte of the stream alone.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::persist::write_atomic;

mod decode;
mod encode;
mod record;
mod segment;
mod tag;
mod value;

pub use record::MetadataRecord;
pub use tag::{Ifd, Tag};
pub use value::{Rational, Value};

/// Read the metadata record of a file.
///
/// Never fails: a missing file, non-JPEG content, an absent EXIF segment or
/// a malformed TIFF block all yield the empty record.
pub fn read_metadata(path: impl AsRef<Path>) -> MetadataRecord {
    let path = path.as_ref();
    match fs::read(path) {
        Ok(bytes) => read_metadata_bytes(&bytes),
        Err(err) => {
            debug!(
                path = %path.display(),
                error = %err,
                "Unreadable file treated as carrying no metadata"
            );
            MetadataRecord::new()
        }
    }
}

/// In-memory variant of [`read_metadata`].
pub fn read_metadata_bytes(bytes: &[u8]) -> MetadataRecord {
    let Some(tiff) = segment::extract_exif_payload(bytes) else {
        return MetadataRecord::new();
    };
    match decode::decode_tiff(tiff) {
        Some(record) => record,
        None => {
            debug!("Malformed TIFF block treated as empty metadata");
            MetadataRecord::new()
        }
    }
}

/// Rewrite `source` with `record` as its only metadata, atomically, into
/// `destination`.
///
/// Pixel data is copied byte for byte. An empty record produces a file with
/// no EXIF segment at all.
pub fn write_metadata(
    source: impl AsRef<Path>,
    record: &MetadataRecord,
    destination: impl AsRef<Path>,
) -> Result<()> {
    let destination = destination.as_ref();
    let bytes = fs::read(source.as_ref())?;
    let rewritten = write_metadata_bytes(&bytes, record)?;
    write_atomic(destination, &rewritten)?;
    debug!(
        destination = %destination.display(),
        fields = record.len(),
        "Wrote metadata"
    );
    Ok(())
}

/// In-memory variant of [`write_metadata`].
pub fn write_metadata_bytes(jpeg: &[u8], record: &MetadataRecord) -> Result<Vec<u8>> {
    if record.is_empty() {
        return segment::strip_exif(jpeg);
    }
    let tiff = encode::encode_tiff(record);
    segment::replace_exif(jpeg, &tiff)
}
