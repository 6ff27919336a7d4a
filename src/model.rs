//! Capability traits for the learner collaborator
//!
//! The harness is polymorphic over any learner implementing these seams; the
//! learning algorithm itself lives outside this crate. Collaborator errors
//! cross the boundary as `anyhow::Error` and are wrapped with fold/try
//! context by the orchestrators.

use serde_json::Value;

use crate::params::ParameterSet;

/// A model that can be fitted on labeled data.
pub trait Trainable {
    /// Fit the model on the given training subset.
    ///
    /// # Errors
    ///
    /// Any failure aborts the enclosing run as a training failure.
    fn fit(&mut self, features: &[Vec<f64>], targets: &[i64]) -> anyhow::Result<()>;
}

/// A fitted model that exposes a prediction at every depth level.
///
/// "Depth" counts iterative/boosting stages; scoring every depth lets the
/// harness find the best-performing stage count.
pub trait DepthwiseScorable {
    /// Number of depth levels the model exposes.
    fn depth_count(&self) -> usize;

    /// Predict labels using only the first `depth + 1` stages.
    fn predict_at_depth(&self, features: &[Vec<f64>], depth: usize) -> Vec<i64>;

    /// Predict labels at full depth.
    fn predict(&self, features: &[Vec<f64>]) -> Vec<i64> {
        self.predict_at_depth(features, self.depth_count().saturating_sub(1))
    }
}

/// A fitted model that can shed training state into a reduced representation
/// suitable for storage.
pub trait Compressible {
    /// Extract the reduced-footprint model state.
    fn compress(&self) -> Value;
}

/// A factory producing fresh model instances from a parameter set.
///
/// Templates replace the original pattern of resetting parameters on one
/// shared estimator; every try gets its own instance.
pub trait EstimatorTemplate {
    /// Concrete model type produced by this template.
    type Model: Trainable + DepthwiseScorable;

    /// Instantiate an unfitted model configured by `params`.
    ///
    /// # Errors
    ///
    /// Fails when `params` is malformed for this model family.
    fn instantiate(&self, params: &ParameterSet) -> anyhow::Result<Self::Model>;

    /// Short model-family tag used in experiment directory names.
    fn tag(&self) -> &str;
}

/// Best depth and its held-out accuracy for one fitted model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthScore {
    /// Depth level achieving the best accuracy (smallest on ties).
    pub best_depth: usize,
    /// Accuracy at that depth.
    pub accuracy: f64,
}

/// Fraction of predictions matching the expected labels.
#[must_use]
pub fn accuracy(predicted: &[i64], expected: &[i64]) -> f64 {
    if expected.is_empty() {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(expected)
        .filter(|(p, e)| p == e)
        .count();
    correct as f64 / expected.len() as f64
}

/// Score `model` on a held-out set at every depth it exposes.
///
/// Tie-break policy: depths are walked in ascending order and only a strictly
/// greater accuracy replaces the incumbent, so the smallest depth wins ties.
/// The selected depth is therefore a pure function of the score vector,
/// independent of fold or try execution order.
#[must_use]
pub fn evaluate_all_depths<M: DepthwiseScorable>(
    model: &M,
    features: &[Vec<f64>],
    targets: &[i64],
) -> DepthScore {
    let mut best = DepthScore {
        best_depth: 0,
        accuracy: 0.0,
    };
    for depth in 0..model.depth_count() {
        let score = accuracy(&model.predict_at_depth(features, depth), targets);
        if score > best.accuracy {
            best = DepthScore {
                best_depth: depth,
                accuracy: score,
            };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted model: one preset prediction vector per depth.
    struct Scripted {
        per_depth: Vec<Vec<i64>>,
    }

    impl DepthwiseScorable for Scripted {
        fn depth_count(&self) -> usize {
            self.per_depth.len()
        }

        fn predict_at_depth(&self, _features: &[Vec<f64>], depth: usize) -> Vec<i64> {
            self.per_depth[depth].clone()
        }
    }

    #[test]
    fn test_accuracy() {
        assert!((accuracy(&[1, 0, 1, 1], &[1, 1, 1, 0]) - 0.5).abs() < 1e-12);
        assert!((accuracy(&[], &[]) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_best_depth_selection() {
        let model = Scripted {
            per_depth: vec![vec![0, 0, 0, 0], vec![1, 0, 1, 0], vec![1, 1, 1, 0]],
        };
        let features = vec![vec![0.0]; 4];
        let score = evaluate_all_depths(&model, &features, &[1, 1, 1, 0]);
        assert_eq!(score.best_depth, 2);
        assert!((score.accuracy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tie_break_prefers_smallest_depth() {
        let model = Scripted {
            per_depth: vec![vec![1, 1, 0, 0], vec![1, 0, 1, 0], vec![0, 1, 1, 0]],
        };
        let features = vec![vec![0.0]; 4];
        // Every depth scores 0.5 against these targets.
        let score = evaluate_all_depths(&model, &features, &[1, 1, 1, 1]);
        assert_eq!(score.best_depth, 0);
    }

    #[test]
    fn test_full_depth_predict_default() {
        let model = Scripted {
            per_depth: vec![vec![0], vec![1]],
        };
        assert_eq!(model.predict(&[vec![0.0]]), vec![1]);
    }
}
