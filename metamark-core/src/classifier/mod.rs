//! Tamper classification.
//!
//! A seeded random forest learns which critical fields a legitimate file
//! from this pipeline carries, and flags files whose presence pattern looks
//! like the tampered class. Models are fitted from the on-disk corpus and
//! persisted to a single CBOR artifact; inference without a model artifact
//! is an error, never a silent guess.

use std::fmt;
use std::fs::File;
use std::path::Path;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus::ClassLabel;
use crate::error::{MetamarkError, Result};
use crate::features::{feature_names, FeatureVector};
use crate::persist::write_atomic;

mod dataset;
mod forest;
mod metrics;
mod trainer;

pub use dataset::{Dataset, TrainingExample};
pub use forest::PresenceForest;
pub use metrics::{evaluate, ClassMetrics, Evaluation};
pub use trainer::{Trainer, TrainingReport};

/// Probability at and above which a file is flagged as suspect.
pub const VERDICT_THRESHOLD: f64 = 0.5;

/// Current on-disk model format.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Verdict assigned to a tamper probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TamperVerdict {
    Normal,
    Suspect,
}

impl fmt::Display for TamperVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TamperVerdict::Normal => f.write_str("normal"),
            TamperVerdict::Suspect => f.write_str("suspect"),
        }
    }
}

/// Outcome of classifying one feature vector.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub verdict: TamperVerdict,
    pub tamper_probability: f64,
}

impl ClassificationResult {
    pub fn from_probability(probability: f64) -> ClassificationResult {
        let probability = probability.clamp(0.0, 1.0);
        let verdict = if probability >= VERDICT_THRESHOLD {
            TamperVerdict::Suspect
        } else {
            TamperVerdict::Normal
        };
        ClassificationResult {
            verdict,
            tamper_probability: probability,
        }
    }
}

/// Knobs for a training run.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub trees: usize,
    pub max_depth: usize,
    pub min_split: usize,
    /// Fraction of each class held out for evaluation.
    pub holdout: f64,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> TrainOptions {
        TrainOptions {
            trees: 100,
            max_depth: 8,
            min_split: 2,
            holdout: 0.3,
            seed: 42,
        }
    }
}

/// Model family boundary: anything that can fit a labeled dataset and score
/// a feature vector.
pub trait TamperClassifier: Sized {
    /// Fit on the dataset's training portion and report holdout metrics.
    fn fit(dataset: &Dataset, options: &TrainOptions) -> Result<(Self, Evaluation)>;

    /// Probability in `[0, 1]` that the vector comes from a tampered file.
    fn tamper_probability(&self, features: &FeatureVector) -> f64;
}

impl TamperClassifier for PresenceForest {
    fn fit(dataset: &Dataset, options: &TrainOptions) -> Result<(Self, Evaluation)> {
        for label in ClassLabel::ALL {
            if dataset.class_count(label) == 0 {
                return Err(MetamarkError::EmptyDataset(format!(
                    "no {label} examples to fit on"
                )));
            }
        }

        let mut rng = StdRng::seed_from_u64(options.seed);
        let (train, test) = dataset.split_stratified(options.holdout, &mut rng);
        let (x, y) = train.feature_matrix();
        let forest = PresenceForest::fit_samples(
            &x,
            &y,
            options.trees,
            options.max_depth,
            options.min_split,
            &mut rng,
        );

        // The holdout split is for reporting only; it never reaches the
        // persisted model.
        let truth: Vec<ClassLabel> = test.examples.iter().map(|e| e.label).collect();
        let predicted: Vec<ClassLabel> = test
            .examples
            .iter()
            .map(|e| {
                if forest.probability(&e.features) >= VERDICT_THRESHOLD {
                    ClassLabel::Tampered
                } else {
                    ClassLabel::Normal
                }
            })
            .collect();
        let evaluation = evaluate(&truth, &predicted);
        info!(
            trained = train.len(),
            evaluated = evaluation.evaluated,
            accuracy = evaluation.accuracy,
            trees = forest.n_trees(),
            "Fitted tamper classifier"
        );
        Ok((forest, evaluation))
    }

    fn tamper_probability(&self, features: &FeatureVector) -> f64 {
        self.probability(features)
    }
}

/// A fitted forest plus enough metadata to sanity-check it at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub format_version: u32,
    /// RFC 3339 timestamp of the training run.
    pub trained_at: String,
    pub feature_names: Vec<String>,
    pub training_examples: usize,
    forest: PresenceForest,
}

impl TrainedModel {
    pub fn new(forest: PresenceForest, training_examples: usize) -> TrainedModel {
        TrainedModel {
            format_version: MODEL_FORMAT_VERSION,
            trained_at: Utc::now().to_rfc3339(),
            feature_names: feature_names(),
            training_examples,
            forest,
        }
    }

    /// Load a model artifact.
    ///
    /// A missing file is `ModelMissing` so callers can tell "train first"
    /// apart from a corrupt artifact.
    pub fn load(path: &Path) -> Result<TrainedModel> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(MetamarkError::ModelMissing {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        let model: TrainedModel = ciborium::from_reader(std::io::BufReader::new(file))
            .map_err(|e| {
                MetamarkError::Serialization(format!("Failed to decode model file: {e}"))
            })?;
        if model.format_version != MODEL_FORMAT_VERSION {
            return Err(MetamarkError::Serialization(format!(
                "Unsupported model format version {} (expected {})",
                model.format_version, MODEL_FORMAT_VERSION
            )));
        }
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes)
            .map_err(|e| MetamarkError::Serialization(format!("Failed to encode model: {e}")))?;
        write_atomic(path, &bytes)
    }

    /// Score a feature vector against this model.
    pub fn classify(&self, features: &FeatureVector) -> Result<ClassificationResult> {
        if features.len() != self.feature_names.len() {
            return Err(MetamarkError::FeatureShapeMismatch {
                expected: self.feature_names.len(),
                actual: features.len(),
            });
        }
        Ok(ClassificationResult::from_probability(
            self.forest.tamper_probability(features),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_dataset() -> Dataset {
        let mut examples = Vec::new();
        for _ in 0..8 {
            examples.push(TrainingExample {
                features: FeatureVector::new(vec![1.0; 5]),
                label: ClassLabel::Normal,
            });
            examples.push(TrainingExample {
                features: FeatureVector::new(vec![0.0; 5]),
                label: ClassLabel::Tampered,
            });
        }
        Dataset::new(examples)
    }

    #[test]
    fn test_threshold_sits_at_one_half_inclusive() {
        assert_eq!(
            ClassificationResult::from_probability(0.5).verdict,
            TamperVerdict::Suspect
        );
        assert_eq!(
            ClassificationResult::from_probability(0.49).verdict,
            TamperVerdict::Normal
        );
        assert_eq!(
            ClassificationResult::from_probability(1.0).verdict,
            TamperVerdict::Suspect
        );
    }

    #[test]
    fn test_probabilities_are_clamped() {
        assert_eq!(ClassificationResult::from_probability(1.5).tamper_probability, 1.0);
        assert_eq!(ClassificationResult::from_probability(-0.1).tamper_probability, 0.0);
    }

    #[test]
    fn test_fit_rejects_a_missing_class() {
        let examples = vec![TrainingExample {
            features: FeatureVector::new(vec![1.0; 5]),
            label: ClassLabel::Normal,
        }];
        let err =
            PresenceForest::fit(&Dataset::new(examples), &TrainOptions::default()).unwrap_err();
        assert!(matches!(err, MetamarkError::EmptyDataset(_)));
    }

    #[test]
    fn test_fit_learns_the_separable_dataset() {
        let (forest, evaluation) =
            PresenceForest::fit(&tiny_dataset(), &TrainOptions::default()).unwrap();

        assert!(forest.tamper_probability(&FeatureVector::new(vec![0.0; 5])) >= 0.5);
        assert!(forest.tamper_probability(&FeatureVector::new(vec![1.0; 5])) < 0.5);
        assert!(evaluation.evaluated > 0);
        assert_eq!(evaluation.accuracy, 1.0);
    }

    #[test]
    fn test_model_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.cbor");
        let (forest, _) =
            PresenceForest::fit(&tiny_dataset(), &TrainOptions::default()).unwrap();
        let model = TrainedModel::new(forest, 16);
        model.save(&path).unwrap();

        let loaded = TrainedModel::load(&path).unwrap();
        assert_eq!(loaded.format_version, MODEL_FORMAT_VERSION);
        assert_eq!(loaded.feature_names, model.feature_names);
        assert_eq!(loaded.training_examples, 16);
        assert_eq!(loaded.forest, model.forest);
    }

    #[test]
    fn test_loading_a_missing_model_is_model_missing() {
        let err = TrainedModel::load(Path::new("/no/such/model.cbor")).unwrap_err();
        assert!(matches!(err, MetamarkError::ModelMissing { .. }));
    }

    #[test]
    fn test_loading_a_corrupt_model_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.cbor");
        std::fs::write(&path, b"definitely not cbor").unwrap();

        let err = TrainedModel::load(&path).unwrap_err();
        assert!(matches!(err, MetamarkError::Serialization(_)));
    }

    #[test]
    fn test_loading_a_future_format_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.cbor");
        let (forest, _) =
            PresenceForest::fit(&tiny_dataset(), &TrainOptions::default()).unwrap();
        let mut model = TrainedModel::new(forest, 16);
        model.format_version = MODEL_FORMAT_VERSION + 1;
        model.save(&path).unwrap();

        let err = TrainedModel::load(&path).unwrap_err();
        assert!(matches!(err, MetamarkError::Serialization(_)));
    }

    #[test]
    fn test_classify_rejects_mismatched_vector_width() {
        let (forest, _) =
            PresenceForest::fit(&tiny_dataset(), &TrainOptions::default()).unwrap();
        let model = TrainedModel::new(forest, 16);

        let err = model.classify(&FeatureVector::new(vec![1.0; 3])).unwrap_err();
        assert!(matches!(
            err,
            MetamarkError::FeatureShapeMismatch {
                expected: 5,
                actual: 3
            }
        ));
    }
}
