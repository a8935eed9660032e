//! Labeled example loading and splitting.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::corpus::{ClassLabel, CorpusLayout};
use crate::error::Result;
use crate::features::{vectorize_file, FeatureVector};

/// One labeled training example.
#[derive(Debug, Clone)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub label: ClassLabel,
}

/// An in-memory labeled dataset.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub examples: Vec<TrainingExample>,
}

fn is_jpeg_name(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

impl Dataset {
    pub fn new(examples: Vec<TrainingExample>) -> Dataset {
        Dataset { examples }
    }

    /// Vectorize every `*.jpg`/`*.jpeg` under the corpus class directories.
    ///
    /// Files are visited in sorted order per class so repeated loads of the
    /// same corpus produce the same dataset.
    pub fn from_corpus(layout: &CorpusLayout) -> Result<Dataset> {
        layout.ensure()?;
        let mut examples = Vec::new();
        for label in ClassLabel::ALL {
            let dir = layout.class_dir(label);
            let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| is_jpeg_name(path))
                .collect();
            paths.sort();
            if paths.is_empty() {
                warn!(dir = %dir.display(), class = %label, "Corpus class has no examples");
            }
            for path in &paths {
                examples.push(TrainingExample {
                    features: vectorize_file(path),
                    label,
                });
            }
            info!(class = %label, examples = paths.len(), "Loaded corpus class");
        }
        Ok(Dataset { examples })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn class_count(&self, label: ClassLabel) -> usize {
        self.examples.iter().filter(|e| e.label == label).count()
    }

    /// Split into (train, test) with the test fraction drawn per class, so
    /// both classes are represented on each side whenever they can be.
    ///
    /// A class is never drained completely into the test split; with a
    /// single example the class goes entirely to training.
    pub fn split_stratified(&self, holdout: f64, rng: &mut StdRng) -> (Dataset, Dataset) {
        let mut train = Vec::new();
        let mut test = Vec::new();
        for label in ClassLabel::ALL {
            let mut class: Vec<&TrainingExample> =
                self.examples.iter().filter(|e| e.label == label).collect();
            class.shuffle(rng);

            let n = class.len();
            let n_test = (((n as f64) * holdout).round() as usize).min(n.saturating_sub(1));
            for (i, example) in class.into_iter().enumerate() {
                if i < n_test {
                    test.push(example.clone());
                } else {
                    train.push(example.clone());
                }
            }
        }
        (Dataset::new(train), Dataset::new(test))
    }

    pub(crate) fn feature_matrix(&self) -> (Vec<FeatureVector>, Vec<bool>) {
        let x = self.examples.iter().map(|e| e.features.clone()).collect();
        let y = self
            .examples
            .iter()
            .map(|e| e.label == ClassLabel::Tampered)
            .collect();
        (x, y)
    }
}
