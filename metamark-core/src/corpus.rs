//! Training corpus layout and archival.
//!
//! The corpus is a directory with one subdirectory per class. Components
//! that produce labeled examples write through the [`CorpusWriter`] trait so
//! callers decide whether archiving hits the filesystem, a buffer, or
//! nothing at all.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::persist::write_atomic;

/// Class a training example belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassLabel {
    Normal,
    Tampered,
}

impl ClassLabel {
    pub const ALL: [ClassLabel; 2] = [ClassLabel::Normal, ClassLabel::Tampered];

    /// Subdirectory name under the corpus root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ClassLabel::Normal => "normal",
            ClassLabel::Tampered => "tampered",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Location of the on-disk corpus.
#[derive(Debug, Clone)]
pub struct CorpusLayout {
    root: PathBuf,
}

impl CorpusLayout {
    pub fn new(root: impl Into<PathBuf>) -> CorpusLayout {
        CorpusLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn class_dir(&self, label: ClassLabel) -> PathBuf {
        self.root.join(label.dir_name())
    }

    /// Create the class directories if they are missing.
    pub fn ensure(&self) -> Result<()> {
        for label in ClassLabel::ALL {
            let dir = self.class_dir(label);
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
                warn!(dir = %dir.display(), "Created empty corpus class directory");
            }
        }
        Ok(())
    }
}

/// Destination for labeled examples.
pub trait CorpusWriter {
    fn archive(&self, label: ClassLabel, file_name: &str, bytes: &[u8]) -> Result<()>;
}

impl<T: CorpusWriter + ?Sized> CorpusWriter for &T {
    fn archive(&self, label: ClassLabel, file_name: &str, bytes: &[u8]) -> Result<()> {
        (**self).archive(label, file_name, bytes)
    }
}

/// Corpus writer backed by the filesystem layout.
#[derive(Debug, Clone)]
pub struct FsCorpus {
    layout: CorpusLayout,
}

impl FsCorpus {
    pub fn new(root: impl Into<PathBuf>) -> FsCorpus {
        FsCorpus {
            layout: CorpusLayout::new(root),
        }
    }

    pub fn layout(&self) -> &CorpusLayout {
        &self.layout
    }
}

impl CorpusWriter for FsCorpus {
    fn archive(&self, label: ClassLabel, file_name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.layout.class_dir(label).join(file_name);
        write_atomic(&path, bytes)?;
        debug!(path = %path.display(), class = %label, "Archived corpus example");
        Ok(())
    }
}

/// Corpus writer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCorpus;

impl CorpusWriter for NoopCorpus {
    fn archive(&self, _label: ClassLabel, _file_name: &str, _bytes: &[u8]) -> Result<()> {
        Ok(())
    }
}

/// In-memory corpus writer for tests.
#[derive(Debug, Default)]
pub struct MemoryCorpus {
    entries: Mutex<Vec<(ClassLabel, String, Vec<u8>)>>,
}

impl MemoryCorpus {
    pub fn new() -> MemoryCorpus {
        MemoryCorpus::default()
    }

    /// Snapshot of everything archived so far, in archival order.
    pub fn archived(&self) -> Vec<(ClassLabel, String, Vec<u8>)> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn get(&self, label: ClassLabel, file_name: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|(l, name, _)| *l == label && name == file_name)
            .map(|(_, _, bytes)| bytes.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CorpusWriter for MemoryCorpus {
    fn archive(&self, label: ClassLabel, file_name: &str, bytes: &[u8]) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((label, file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}
