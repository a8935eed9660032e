use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetamarkError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Metadata block too large: {size} bytes exceeds the {limit}-byte APP1 limit")]
    MetadataTooLarge { size: usize, limit: usize },

    #[error("Empty training dataset: {0}")]
    EmptyDataset(String),

    #[error("No trained model at {}: run a training pass first", path.display())]
    ModelMissing { path: PathBuf },

    #[error("Feature vector has {actual} entries, model expects {expected}")]
    FeatureShapeMismatch { expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MetamarkError>;
