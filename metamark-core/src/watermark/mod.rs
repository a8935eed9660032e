//! Watermark embedding and verification.
//!
//! The watermark is an owner identity written into the EXIF Artist field.
//! It is readable by any standard metadata viewer; the point is provenance
//! plus a tamper tripwire, not secrecy.

use crate::exif::Tag;

mod embed;
mod verify;

pub use embed::Embedder;
pub use verify::{verify, VerificationReport, WatermarkStatus};

/// Field that carries the ownership watermark.
pub const WATERMARK_TAG: Tag = Tag::Artist;
