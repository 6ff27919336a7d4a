//! Repeated-shuffle cross-validation
//!
//! Many independent shuffles of the full dataset, each scored with plain
//! k-fold cross-validation, give an accuracy estimate robust to
//! partition-order effects. This is a lightweight robustness check: no
//! experiment record is produced.

use rayon::prelude::*;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::model::{accuracy, DepthwiseScorable, EstimatorTemplate, Trainable};
use crate::params::ParameterSet;
use crate::partition::k_fold;

/// Repeated-shuffle evaluation orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct RepeatedShuffleEvaluator {
    /// Number of independent dataset shuffles.
    pub repeat_count: usize,
    /// Folds per cross-validation pass.
    pub fold_count: usize,
    /// Worker pool size (0 means one per core).
    pub job_count: usize,
}

impl RepeatedShuffleEvaluator {
    /// Create an evaluator.
    #[must_use]
    pub const fn new(repeat_count: usize, fold_count: usize, job_count: usize) -> Self {
        Self {
            repeat_count,
            fold_count,
            job_count,
        }
    }

    /// Evaluate and return `(mean, std)` of per-repeat accuracies.
    ///
    /// Repeat `r` shuffles the dataset with seed `params.seed() + r`, splits
    /// the shuffled order into contiguous folds, and scores the model's
    /// full-depth prediction on each held-out fold. The repeat's score is the
    /// mean over its folds; the returned pair aggregates over repeats.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidFoldCount`] / [`Error::InvalidDatasetShape`] from
    ///   the plain fold split
    /// * [`Error::Training`] when any fit fails, with the fold index and the
    ///   repeat index in the try slot
    pub fn run<T>(
        &self,
        template: &T,
        params: &ParameterSet,
        dataset: &Dataset,
    ) -> Result<(f64, f64)>
    where
        T: EstimatorTemplate + Sync,
    {
        // Same length every repeat, so the split is computed once.
        let folds = k_fold(dataset.len(), self.fold_count)?;
        let base_seed = params.seed();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.job_count)
            .build()
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        let scores: Vec<f64> = pool.install(|| {
            (0..self.repeat_count)
                .into_par_iter()
                .map(|repeat| {
                    let shuffled = dataset.shuffled(base_seed.wrapping_add(repeat as u64));
                    let mut fold_scores = Vec::with_capacity(folds.len());
                    for (fold_index, fold) in folds.iter().enumerate() {
                        let score = Self::score_fold(template, params, &shuffled, fold)
                            .map_err(|source| Error::Training {
                                fold: fold_index,
                                try_index: repeat,
                                source,
                            })?;
                        fold_scores.push(score);
                    }
                    Ok(crate::stats::mean(&fold_scores))
                })
                .collect::<Result<Vec<f64>>>()
        })?;

        Ok((
            crate::stats::mean(&scores),
            crate::stats::population_std(&scores),
        ))
    }

    /// Fit on a fold's training portion and score full-depth accuracy on its
    /// held-out portion.
    fn score_fold<T: EstimatorTemplate>(
        template: &T,
        params: &ParameterSet,
        dataset: &Dataset,
        fold: &crate::partition::Fold,
    ) -> anyhow::Result<f64> {
        let (train_x, train_y) = dataset.subset(fold.train_indices());
        let (test_x, test_y) = dataset.subset(fold.test_indices());
        let mut model = template.instantiate(params)?;
        model.fit(&train_x, &train_y)?;
        Ok(accuracy(&model.predict(&test_x), &test_y))
    }
}
