//! Metamark Core - EXIF watermarking and tamper-detection library
//!
//! This crate provides the building blocks for marking image ownership through
//! EXIF metadata and for deciding whether that metadata has since been
//! stripped or forged.
//!
//! # Features
//!
//! - Lossless EXIF read/write on JPEG files (pixel data is never re-encoded)
//! - Identity watermarking through the EXIF Artist field
//! - Field-by-field metadata comparison with categorized differences
//! - Seeded random-forest tamper classifier over critical-field presence
//! - CBOR model persistence with atomic writes
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use metamark_core::{verify, Embedder, NoopCorpus, WatermarkStatus};
//!
//! # fn example() -> metamark_core::Result<()> {
//! // Embed an ownership watermark into a photo
//! let embedder = Embedder::new(NoopCorpus);
//! embedder.embed(
//!     Path::new("photo.jpg"),
//!     "metamark:alice",
//!     Path::new("wm_photo.jpg"),
//! )?;
//!
//! // Later, check the watermark is still intact
//! let report = verify("wm_photo.jpg", "metamark:alice");
//! assert_eq!(report.status, WatermarkStatus::Matches);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod compare;
pub mod corpus;
pub mod error;
pub mod exif;
pub mod features;
pub mod persist;
pub mod tamper;
pub mod watermark;

// Re-export main types for convenience
pub use classifier::{
    evaluate, ClassMetrics, ClassificationResult, Dataset, Evaluation, PresenceForest,
    TamperClassifier, TamperVerdict, TrainOptions, TrainedModel, Trainer, TrainingExample,
    TrainingReport, MODEL_FORMAT_VERSION, VERDICT_THRESHOLD,
};
pub use compare::{compare, compare_records, ComparisonReport, DiffCategory, DiffEntry};
pub use corpus::{ClassLabel, CorpusLayout, CorpusWriter, FsCorpus, MemoryCorpus, NoopCorpus};
pub use error::{MetamarkError, Result};
pub use exif::{
    read_metadata, read_metadata_bytes, write_metadata, write_metadata_bytes, Ifd,
    MetadataRecord, Rational, Tag, Value,
};
pub use features::{
    feature_names, missing_critical_fields, vectorize_file, vectorize_record, FeatureVector,
    CRITICAL_FIELDS,
};
pub use persist::write_atomic;
pub use tamper::{
    AppliedTamper, TamperForge, TamperMode, FORGED_ARTIST, FORGED_TIMESTAMP,
};
pub use watermark::{verify, Embedder, VerificationReport, WatermarkStatus, WATERMARK_TAG};
