use std::fs;
use std::path::Path;

use tracing::info;

use crate::corpus::{ClassLabel, CorpusWriter};
use crate::error::{MetamarkError, Result};
use crate::exif::{read_metadata_bytes, write_metadata_bytes, Value};
use crate::persist::write_atomic;

use super::WATERMARK_TAG;

/// Writes identity watermarks into images and archives the results as
/// known-normal training examples.
pub struct Embedder<C: CorpusWriter> {
    corpus: C,
}

impl<C: CorpusWriter> Embedder<C> {
    pub fn new(corpus: C) -> Embedder<C> {
        Embedder { corpus }
    }

    /// Set the watermark field of `source` to `identity` and write the
    /// result to `output`.
    ///
    /// Every other metadata field is preserved; a prior watermark is
    /// overwritten. The output file is written atomically and archived into
    /// the normal corpus class under its file name.
    pub fn embed(&self, source: &Path, identity: &str, output: &Path) -> Result<()> {
        let bytes = fs::read(source)?;
        image::load_from_memory(&bytes)
            .map_err(|e| MetamarkError::Decode(format!("Not a decodable image: {e}")))?;

        let record =
            read_metadata_bytes(&bytes).with_value(WATERMARK_TAG, Value::text(identity));
        let tagged = write_metadata_bytes(&bytes, &record)?;
        write_atomic(output, &tagged)?;

        let file_name = output
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("embedded.jpg");
        self.corpus.archive(ClassLabel::Normal, file_name, &tagged)?;
        info!(
            source = %source.display(),
            output = %output.display(),
            identity,
            "Embedded watermark"
        );
        Ok(())
    }
}
