//! Stratified k-fold experiment runner
//!
//! Orchestrates one full experiment: partition the dataset, run seed-perturbed
//! training tries per fold, score every depth on the held-out set, aggregate
//! fold×try statistics, and hand the assembled record to the persistence
//! collaborator. A failure in any fold/try aborts the whole run; nothing
//! partial is persisted.

use std::time::Instant;

use serde_json::{json, Value};
use tracing::info;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::model::{evaluate_all_depths, Compressible, EstimatorTemplate, Trainable};
use crate::params::ParameterSet;
use crate::partition::stratified_k_fold;
use crate::record::{ExperimentRecord, ExperimentRecorder, TrialResult};
use crate::stats;

/// Per-run configuration for [`KFoldExperimentRunner`].
///
/// Created per run and passed in explicitly; there is no process-wide
/// configuration state.
#[derive(Debug, Clone)]
pub struct KFoldOptions {
    /// Number of stratified folds.
    pub fold_count: usize,
    /// Seed for the fold partitioning shuffle.
    pub seed: u64,
    /// Seed-perturbed training repetitions per fold.
    pub try_count: usize,
    /// Store compressed model state in monitors.
    pub retain_models: bool,
    /// Emit config/results/monitors through tracing at run end.
    pub enable_logging: bool,
}

impl Default for KFoldOptions {
    fn default() -> Self {
        Self {
            fold_count: 5,
            seed: 0,
            try_count: 3,
            retain_models: true,
            enable_logging: true,
        }
    }
}

/// Cross-validation experiment orchestrator.
pub struct KFoldExperimentRunner<R> {
    recorder: R,
    options: KFoldOptions,
}

impl<R: ExperimentRecorder> KFoldExperimentRunner<R> {
    /// Create a runner with the given persistence collaborator and options.
    pub const fn new(recorder: R, options: KFoldOptions) -> Self {
        Self { recorder, options }
    }

    /// Get the run options.
    pub const fn options(&self) -> &KFoldOptions {
        &self.options
    }

    /// Run the full experiment and return its record.
    ///
    /// Per fold, `try_count` models are trained on isolated parameter copies
    /// carrying seeds `base, base + 1, ...` where `base` is the seed of
    /// `params`. Each try is scored at every depth on the held-out set.
    /// The record is persisted under `{experiment_name}_{model}_{dataset}`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidFoldCount`] / [`Error::InsufficientClassSamples`]
    ///   from partitioning, before any training starts
    /// * [`Error::Training`] with fold/try coordinates when any fit or
    ///   instantiation fails; the run aborts and nothing is persisted
    /// * [`Error::Persistence`] when the recorder fails; the computed record
    ///   is carried inside the error
    pub fn run<T>(
        &self,
        template: &T,
        params: &ParameterSet,
        dataset: &Dataset,
        experiment_name: &str,
    ) -> Result<ExperimentRecord>
    where
        T: EstimatorTemplate,
        T::Model: Compressible,
    {
        let folds = stratified_k_fold(
            dataset.targets(),
            self.options.fold_count,
            self.options.seed,
        )?;

        let dir_key = format!("{experiment_name}_{}_{}", template.tag(), dataset.name());
        let full_name = format!("{dir_key}_{}", params.short_tag());

        let mut record = ExperimentRecord::new(full_name);
        record.set_config("n_folds", self.options.fold_count as u64);
        record.set_config("seed", self.options.seed);
        record.set_config("n_tries", self.options.try_count as u64);
        record.set_config("store_clf", self.options.retain_models);
        record.set_config("params", params.to_value());

        let base_seed = params.seed();
        let mut trials: Vec<Vec<TrialResult>> = Vec::with_capacity(folds.len());

        for (fold_index, fold) in folds.iter().enumerate() {
            let (train_x, train_y) = dataset.subset(fold.train_indices());
            let (test_x, test_y) = dataset.subset(fold.test_indices());

            let mut fold_trials = Vec::with_capacity(self.options.try_count);
            for try_index in 0..self.options.try_count {
                // Isolated copy per try: the caller's params never mutate.
                // Wrapping keeps the derived-seed rule total near u64::MAX.
                let try_params = params.with_seed(base_seed.wrapping_add(try_index as u64));
                let trial = self
                    .run_try(template, &try_params, &train_x, &train_y, &test_x, &test_y)
                    .map_err(|source| Error::Training {
                        fold: fold_index,
                        try_index,
                        source,
                    })?;
                fold_trials.push(TrialResult {
                    fold: fold_index,
                    try_index,
                    ..trial
                });
            }
            trials.push(fold_trials);
        }

        self.aggregate(&mut record, &trials, dataset);

        if self.options.enable_logging {
            let config = Value::Object(record.config().clone());
            let results = Value::Object(record.results().clone());
            info!(
                target: "foldwise::kfold",
                config = %config,
                results = %results,
                "k-fold experiment complete"
            );
        }

        match self.recorder.record(&record, &dir_key) {
            Ok(()) => Ok(record),
            Err(source) => Err(Error::Persistence {
                source: Box::new(source),
                record: Box::new(record),
            }),
        }
    }

    /// Train and evaluate one try; coordinates are attached by the caller.
    fn run_try<T>(
        &self,
        template: &T,
        try_params: &ParameterSet,
        train_x: &[Vec<f64>],
        train_y: &[i64],
        test_x: &[Vec<f64>],
        test_y: &[i64],
    ) -> anyhow::Result<TrialResult>
    where
        T: EstimatorTemplate,
        T::Model: Compressible,
    {
        let mut model = template.instantiate(try_params)?;

        let train_start = Instant::now();
        model.fit(train_x, train_y)?;
        let train_time = train_start.elapsed().as_secs_f64();

        let test_start = Instant::now();
        let score = evaluate_all_depths(&model, test_x, test_y);
        let test_time = test_start.elapsed().as_secs_f64();

        let compressed_model = self.options.retain_models.then(|| model.compress());

        Ok(TrialResult {
            fold: 0,
            try_index: 0,
            train_time,
            test_time,
            best_depth: score.best_depth,
            accuracy: score.accuracy,
            compressed_model,
        })
    }

    /// Fold×try aggregation into the record's results and monitors.
    fn aggregate(
        &self,
        record: &mut ExperimentRecord,
        trials: &[Vec<TrialResult>],
        dataset: &Dataset,
    ) {
        let acc_fold: Vec<Vec<f64>> = trials
            .iter()
            .map(|fold| fold.iter().map(|t| t.accuracy).collect())
            .collect();
        let train_time: Vec<Vec<f64>> = trials
            .iter()
            .map(|fold| fold.iter().map(|t| t.train_time).collect())
            .collect();
        let test_time: Vec<Vec<f64>> = trials
            .iter()
            .map(|fold| fold.iter().map(|t| t.test_time).collect())
            .collect();
        let best_depth: Vec<Vec<u64>> = trials
            .iter()
            .map(|fold| fold.iter().map(|t| t.best_depth as u64).collect())
            .collect();

        let flat = stats::flatten(&acc_fold);
        record.set_result("mean_acc", stats::mean(&flat));
        record.set_monitor("std", stats::population_std(&flat));
        record.set_monitor("acc_fold", json!(acc_fold));
        record.set_monitor("train_time", json!(train_time));
        record.set_monitor("test_time", json!(test_time));
        record.set_monitor("best_depth", json!(best_depth));

        if self.options.retain_models {
            let compressed: Vec<&Value> = trials
                .iter()
                .flatten()
                .filter_map(|t| t.compressed_model.as_ref())
                .collect();
            record.set_monitor("clf", json!(compressed));
        }

        record.set_monitor("n_dim", dataset.n_dim() as u64);
        record.set_monitor("n_class", dataset.n_class() as u64);
        record.set_monitor("data_name", dataset.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = KFoldOptions::default();
        assert_eq!(options.fold_count, 5);
        assert_eq!(options.try_count, 3);
        assert!(options.retain_models);
        assert!(options.enable_logging);
    }
}
