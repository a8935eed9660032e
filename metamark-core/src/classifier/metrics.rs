//! Holdout evaluation metrics.

use serde::Serialize;

use crate::corpus::ClassLabel;

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassMetrics {
    pub label: ClassLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true examples of this class in the evaluated split.
    pub support: usize,
}

/// Aggregate metrics over an evaluation split.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub classes: Vec<ClassMetrics>,
    pub evaluated: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Score predictions against ground truth. Undefined ratios (no positives,
/// no predictions for a class) evaluate to 0 rather than NaN.
pub fn evaluate(truth: &[ClassLabel], predicted: &[ClassLabel]) -> Evaluation {
    debug_assert_eq!(truth.len(), predicted.len());
    let n = truth.len().min(predicted.len());
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();

    let classes = ClassLabel::ALL
        .iter()
        .map(|&label| {
            let tp = (0..n).filter(|&i| truth[i] == label && predicted[i] == label).count();
            let fp = (0..n).filter(|&i| truth[i] != label && predicted[i] == label).count();
            let missed = (0..n).filter(|&i| truth[i] == label && predicted[i] != label).count();

            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, tp + missed);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            ClassMetrics {
                label,
                precision,
                recall,
                f1,
                support: tp + missed,
            }
        })
        .collect();

    Evaluation {
        accuracy: ratio(correct, n),
        classes,
        evaluated: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ClassLabel::{Normal, Tampered};

    #[test]
    fn test_perfect_predictions() {
        let truth = [Normal, Normal, Tampered, Tampered];
        let evaluation = evaluate(&truth, &truth);

        assert_eq!(evaluation.accuracy, 1.0);
        assert_eq!(evaluation.evaluated, 4);
        for class in &evaluation.classes {
            assert_eq!(class.precision, 1.0);
            assert_eq!(class.recall, 1.0);
            assert_eq!(class.f1, 1.0);
            assert_eq!(class.support, 2);
        }
    }

    #[test]
    fn test_mixed_predictions() {
        let truth = [Normal, Normal, Tampered, Tampered];
        let predicted = [Normal, Tampered, Tampered, Tampered];
        let evaluation = evaluate(&truth, &predicted);

        assert_eq!(evaluation.accuracy, 0.75);
        let normal = &evaluation.classes[0];
        assert_eq!(normal.precision, 1.0);
        assert_eq!(normal.recall, 0.5);
        let tampered = &evaluation.classes[1];
        assert_eq!(tampered.precision, 2.0 / 3.0);
        assert_eq!(tampered.recall, 1.0);
    }

    #[test]
    fn test_absent_class_scores_zero_not_nan() {
        let truth = [Normal, Normal];
        let predicted = [Normal, Normal];
        let evaluation = evaluate(&truth, &predicted);

        let tampered = &evaluation.classes[1];
        assert_eq!(tampered.precision, 0.0);
        assert_eq!(tampered.recall, 0.0);
        assert_eq!(tampered.f1, 0.0);
        assert_eq!(tampered.support, 0);
    }

    #[test]
    fn test_empty_split() {
        let evaluation = evaluate(&[], &[]);
        assert_eq!(evaluation.accuracy, 0.0);
        assert_eq!(evaluation.evaluated, 0);
    }
}
