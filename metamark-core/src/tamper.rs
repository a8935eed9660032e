//! Deliberate tamper generation.
//!
//! The classifier needs labeled tampered examples; this module manufactures
//! them by doing what real metadata scrubbing and forgery tools do to a
//! file, either wiping the block or replacing it with forged values.

use std::fmt;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::error::{MetamarkError, Result};
use crate::exif::{write_metadata_bytes, MetadataRecord, Tag, Value};
use crate::persist::write_atomic;
use crate::watermark::WATERMARK_TAG;

/// Watermark value a forgery leaves behind.
pub const FORGED_ARTIST: &str = "anonymous";

/// Capture timestamp a forgery leaves behind.
pub const FORGED_TIMESTAMP: &str = "2000:01:01 00:00:00";

/// Requested tampering behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TamperMode {
    /// Remove the metadata block entirely.
    Strip,
    /// Replace the block with forged watermark and timestamp values.
    Modify,
    /// Uniformly pick one of the above per invocation.
    Random,
}

/// Tamper actually applied to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliedTamper {
    Strip,
    Modify,
}

impl fmt::Display for AppliedTamper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppliedTamper::Strip => f.write_str("strip"),
            AppliedTamper::Modify => f.write_str("modify"),
        }
    }
}

/// Produces tampered copies of images.
pub struct TamperForge {
    rng: StdRng,
}

impl TamperForge {
    pub fn new() -> TamperForge {
        TamperForge {
            rng: StdRng::from_entropy(),
        }
    }

    /// A forge whose `Random` picks are reproducible.
    pub fn with_seed(seed: u64) -> TamperForge {
        TamperForge {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Write a tampered copy of `source` to `output`, returning which
    /// concrete tamper was applied.
    pub fn tamper(
        &mut self,
        source: &Path,
        output: &Path,
        mode: TamperMode,
    ) -> Result<AppliedTamper> {
        let bytes = fs::read(source)?;
        image::load_from_memory(&bytes)
            .map_err(|e| MetamarkError::Decode(format!("Not a decodable image: {e}")))?;

        let applied = match mode {
            TamperMode::Strip => AppliedTamper::Strip,
            TamperMode::Modify => AppliedTamper::Modify,
            TamperMode::Random => {
                if self.rng.gen_bool(0.5) {
                    AppliedTamper::Strip
                } else {
                    AppliedTamper::Modify
                }
            }
        };
        let record = match applied {
            AppliedTamper::Strip => MetadataRecord::new(),
            AppliedTamper::Modify => MetadataRecord::from_entries([
                (WATERMARK_TAG, Value::text(FORGED_ARTIST)),
                (Tag::DateTime, Value::text(FORGED_TIMESTAMP)),
            ]),
        };

        let tampered = write_metadata_bytes(&bytes, &record)?;
        write_atomic(output, &tampered)?;
        info!(
            source = %source.display(),
            output = %output.display(),
            applied = %applied,
            "Generated tampered copy"
        );
        Ok(applied)
    }
}

impl Default for TamperForge {
    fn default() -> TamperForge {
        TamperForge::new()
    }
}
