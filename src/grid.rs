//! Grid search over one shared stratified partitioning
//!
//! The runner builds a single fold partitioning and hands it to the search
//! utility, so every parameter combination is compared on identical folds.
//! The utility itself is a collaborator seam; [`ExhaustiveGridSearch`] is the
//! built-in exhaustive implementation with a `job_count`-sized worker pool.

use std::time::Instant;

use rayon::prelude::*;
use serde_json::{json, Value};
use tracing::info;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::model::{evaluate_all_depths, Compressible, EstimatorTemplate, Trainable};
use crate::params::{ParamGrid, ParameterSet};
use crate::partition::{stratified_k_fold, Fold};
use crate::record::{ExperimentRecord, ExperimentRecorder};
use crate::stats;

/// Per-fold scores of one parameter combination.
#[derive(Debug, Clone, PartialEq)]
pub struct ComboScore {
    /// The parameter combination evaluated.
    pub params: ParameterSet,
    /// Held-out accuracy per fold.
    pub fold_scores: Vec<f64>,
}

impl ComboScore {
    /// Mean score across folds.
    #[must_use]
    pub fn mean_score(&self) -> f64 {
        stats::mean(&self.fold_scores)
    }

    /// Population standard deviation across folds.
    #[must_use]
    pub fn std_score(&self) -> f64 {
        stats::population_std(&self.fold_scores)
    }
}

/// What a grid-search utility returns.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best-scoring parameter combination.
    pub best_params: ParameterSet,
    /// Its mean cross-fold score.
    pub best_score: f64,
    /// Per-combination score series, in grid order.
    pub combos: Vec<ComboScore>,
}

/// External grid-search utility seam.
///
/// Implementations receive the fold partitioning ready-made; they must score
/// every combination against exactly those folds.
pub trait GridSearch<T: EstimatorTemplate> {
    /// Enumerate and score parameter combinations.
    ///
    /// # Errors
    ///
    /// Utility errors propagate unmodified; the runner wraps them as a
    /// search failure and persists nothing.
    fn search(
        &self,
        template: &T,
        dataset: &Dataset,
        grid: &ParamGrid,
        folds: &[Fold],
        scoring: &str,
        job_count: usize,
    ) -> anyhow::Result<SearchOutcome>;
}

/// Exhaustive grid search: every combination, every fold.
///
/// Combinations are scored in parallel on a worker pool of `job_count`
/// threads (0 means one per core). The best combination maximizes the mean
/// cross-fold score; ties go to the earliest combination in grid order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveGridSearch;

impl<T> GridSearch<T> for ExhaustiveGridSearch
where
    T: EstimatorTemplate + Sync,
{
    fn search(
        &self,
        template: &T,
        dataset: &Dataset,
        grid: &ParamGrid,
        folds: &[Fold],
        scoring: &str,
        job_count: usize,
    ) -> anyhow::Result<SearchOutcome> {
        if scoring != "accuracy" {
            anyhow::bail!("unsupported scoring function: {scoring}");
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(job_count)
            .build()?;
        let combos: Vec<ComboScore> = pool.install(|| {
            grid.combinations()
                .into_par_iter()
                .map(|params| {
                    let fold_scores = folds
                        .iter()
                        .map(|fold| score_fold(template, &params, dataset, fold))
                        .collect::<anyhow::Result<Vec<f64>>>()?;
                    Ok(ComboScore {
                        params,
                        fold_scores,
                    })
                })
                .collect::<anyhow::Result<Vec<ComboScore>>>()
        })?;

        if combos.is_empty() {
            anyhow::bail!("empty parameter grid: an axis has no candidate values");
        }

        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (index, combo) in combos.iter().enumerate() {
            let score = combo.mean_score();
            if score > best_score {
                best_index = index;
                best_score = score;
            }
        }

        Ok(SearchOutcome {
            best_params: combos[best_index].params.clone(),
            best_score,
            combos,
        })
    }
}

/// Fit one combination on a fold's training subset and score its held-out
/// accuracy at the best depth.
fn score_fold<T: EstimatorTemplate>(
    template: &T,
    params: &ParameterSet,
    dataset: &Dataset,
    fold: &Fold,
) -> anyhow::Result<f64> {
    let (train_x, train_y) = dataset.subset(fold.train_indices());
    let (test_x, test_y) = dataset.subset(fold.test_indices());
    let mut model = template.instantiate(params)?;
    model.fit(&train_x, &train_y)?;
    Ok(evaluate_all_depths(&model, &test_x, &test_y).accuracy)
}

/// Per-run configuration for [`GridSearchRunner`].
#[derive(Debug, Clone)]
pub struct GridSearchOptions {
    /// Number of stratified folds shared by every combination.
    pub fold_count: usize,
    /// Seed for the shared fold partitioning.
    pub seed: u64,
    /// Worker pool size for the search utility (0 means one per core).
    pub job_count: usize,
    /// Scoring function name handed to the search utility.
    pub scoring: String,
    /// Refit the best combination on the full dataset and store its
    /// compressed state in monitors.
    pub retain_best_model: bool,
    /// Record per-combination parameter sets, means, and deviations.
    pub extended_stats: bool,
}

impl Default for GridSearchOptions {
    fn default() -> Self {
        Self {
            fold_count: 5,
            seed: 0,
            job_count: 8,
            scoring: "accuracy".to_string(),
            retain_best_model: false,
            extended_stats: false,
        }
    }
}

/// Grid-search experiment orchestrator.
pub struct GridSearchRunner<R> {
    recorder: R,
    options: GridSearchOptions,
}

impl<R: ExperimentRecorder> GridSearchRunner<R> {
    /// Create a runner with the given persistence collaborator and options.
    pub const fn new(recorder: R, options: GridSearchOptions) -> Self {
        Self { recorder, options }
    }

    /// Get the run options.
    pub const fn options(&self) -> &GridSearchOptions {
        &self.options
    }

    /// Run the search and return its record.
    ///
    /// One stratified partitioning is built up front and shared across all
    /// parameter combinations, so every candidate is compared on identical
    /// folds.
    ///
    /// # Errors
    ///
    /// * partitioning errors, before the utility is invoked
    /// * [`Error::Search`] when the utility (or the best-model refit) fails;
    ///   nothing is persisted
    /// * [`Error::Persistence`] carrying the computed record
    pub fn run<T, S>(
        &self,
        searcher: &S,
        template: &T,
        dataset: &Dataset,
        grid: &ParamGrid,
        experiment_name: &str,
    ) -> Result<ExperimentRecord>
    where
        T: EstimatorTemplate,
        T::Model: Compressible,
        S: GridSearch<T>,
    {
        let folds = stratified_k_fold(
            dataset.targets(),
            self.options.fold_count,
            self.options.seed,
        )?;

        let dir_key = format!("{experiment_name}_{}_{}", template.tag(), dataset.name());
        let mut record = ExperimentRecord::new(dir_key.clone());
        record.set_config("n_dim", dataset.n_dim() as u64);
        record.set_config("n_class", dataset.n_class() as u64);
        record.set_config("data_name", dataset.name());
        record.set_config("scoring", self.options.scoring.as_str());
        record.set_config("store_clf", self.options.retain_best_model);
        record.set_config("n_jobs", self.options.job_count as u64);
        record.set_config("seed", self.options.seed);
        record.set_config("more", self.options.extended_stats);
        record.set_config("n_folds", self.options.fold_count as u64);

        let start = Instant::now();
        let outcome = searcher
            .search(
                template,
                dataset,
                grid,
                &folds,
                &self.options.scoring,
                self.options.job_count,
            )
            .map_err(Error::Search)?;
        record.set_monitor("grid_time", start.elapsed().as_secs_f64());

        record.set_result("best_params", outcome.best_params.to_value());
        record.set_result("best_score", outcome.best_score);

        if let Some(best) = outcome
            .combos
            .iter()
            .find(|combo| combo.params == outcome.best_params)
        {
            record.set_monitor("best_std", best.std_score());
        }

        if self.options.extended_stats {
            let fold_params: Vec<Value> =
                outcome.combos.iter().map(|c| c.params.to_value()).collect();
            let means: Vec<f64> = outcome.combos.iter().map(ComboScore::mean_score).collect();
            let stds: Vec<f64> = outcome.combos.iter().map(ComboScore::std_score).collect();
            record.set_monitor("fold_params", json!(fold_params));
            record.set_monitor("mean_fold_scores", json!(means));
            record.set_monitor("std_fold_scores", json!(stds));
        }

        if self.options.retain_best_model {
            let compressed = self
                .refit_best(template, &outcome.best_params, dataset)
                .map_err(Error::Search)?;
            record.set_monitor("clf", compressed);
        }

        info!(
            target: "foldwise::grid",
            best_score = outcome.best_score,
            combos = outcome.combos.len(),
            "grid search complete"
        );

        match self.recorder.record(&record, &dir_key) {
            Ok(()) => Ok(record),
            Err(source) => Err(Error::Persistence {
                source: Box::new(source),
                record: Box::new(record),
            }),
        }
    }

    /// Refit the winning combination on the full dataset for retention.
    fn refit_best<T>(
        &self,
        template: &T,
        best_params: &ParameterSet,
        dataset: &Dataset,
    ) -> anyhow::Result<Value>
    where
        T: EstimatorTemplate,
        T::Model: Compressible,
    {
        let mut model = template.instantiate(best_params)?;
        model.fit(dataset.features(), dataset.targets())?;
        Ok(model.compress())
    }
}
