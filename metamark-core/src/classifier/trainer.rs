use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::corpus::{ClassLabel, CorpusLayout};
use crate::error::{MetamarkError, Result};

use super::dataset::Dataset;
use super::{Evaluation, PresenceForest, TamperClassifier, TrainOptions, TrainedModel};

/// End-to-end training pass: scan the corpus, fit, evaluate, persist.
pub struct Trainer {
    layout: CorpusLayout,
    model_path: PathBuf,
    options: TrainOptions,
}

/// What a training run produced.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub normal_examples: usize,
    pub tampered_examples: usize,
    pub evaluation: Evaluation,
    pub model_path: PathBuf,
}

impl Trainer {
    pub fn new(layout: CorpusLayout, model_path: impl Into<PathBuf>) -> Trainer {
        Trainer {
            layout,
            model_path: model_path.into(),
            options: TrainOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TrainOptions) -> Trainer {
        self.options = options;
        self
    }

    pub fn run(&self) -> Result<TrainingReport> {
        let dataset = Dataset::from_corpus(&self.layout)?;
        for label in ClassLabel::ALL {
            if dataset.class_count(label) == 0 {
                return Err(MetamarkError::EmptyDataset(format!(
                    "no JPEG examples in {}",
                    self.layout.class_dir(label).display()
                )));
            }
        }

        let (forest, evaluation) = PresenceForest::fit(&dataset, &self.options)?;
        let model = TrainedModel::new(forest, dataset.len());
        model.save(&self.model_path)?;
        info!(
            model = %self.model_path.display(),
            examples = dataset.len(),
            accuracy = evaluation.accuracy,
            "Saved trained model"
        );

        Ok(TrainingReport {
            normal_examples: dataset.class_count(ClassLabel::Normal),
            tampered_examples: dataset.class_count(ClassLabel::Tampered),
            evaluation,
            model_path: self.model_path.clone(),
        })
    }
}
