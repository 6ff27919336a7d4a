//! # Foldwise: Cross-Validation Experiment Harness
//!
//! Foldwise orchestrates experiments over depth-parameterized classifiers:
//! stratified k-fold partitioning, per-fold multi-try training with seed
//! perturbation, per-depth model scoring, grid search over one shared
//! partitioning, repeated-shuffle robustness checks, and structured
//! experiment records handed to a persistence collaborator.
//!
//! The learner itself is a collaborator: anything implementing the capability
//! traits in [`model`] (fit, predict-at-depth, compress) plugs in.
//!
//! ## Example
//!
//! ```rust,no_run
//! use foldwise::{
//!     Dataset, KFoldExperimentRunner, KFoldOptions, NullRecorder, ParameterSet,
//! };
//! # use foldwise::model::{Compressible, DepthwiseScorable, EstimatorTemplate, Trainable};
//! # struct Stub;
//! # impl Trainable for Stub {
//! #     fn fit(&mut self, _: &[Vec<f64>], _: &[i64]) -> anyhow::Result<()> { Ok(()) }
//! # }
//! # impl DepthwiseScorable for Stub {
//! #     fn depth_count(&self) -> usize { 1 }
//! #     fn predict_at_depth(&self, f: &[Vec<f64>], _: usize) -> Vec<i64> { vec![0; f.len()] }
//! # }
//! # impl Compressible for Stub {
//! #     fn compress(&self) -> serde_json::Value { serde_json::Value::Null }
//! # }
//! # struct StubTemplate;
//! # impl EstimatorTemplate for StubTemplate {
//! #     type Model = Stub;
//! #     fn instantiate(&self, _: &ParameterSet) -> anyhow::Result<Stub> { Ok(Stub) }
//! #     fn tag(&self) -> &str { "stub" }
//! # }
//!
//! let dataset = Dataset::new(
//!     "toy",
//!     vec![vec![0.0], vec![1.0], vec![0.5], vec![1.5]],
//!     vec![0, 1, 0, 1],
//! )?;
//! let runner = KFoldExperimentRunner::new(
//!     NullRecorder,
//!     KFoldOptions { fold_count: 2, try_count: 1, ..KFoldOptions::default() },
//! );
//! let record = runner.run(&StubTemplate, &ParameterSet::new(), &dataset, "demo")?;
//! println!("mean accuracy: {:?}", record.result("mean_acc"));
//! # Ok::<(), foldwise::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::cast_precision_loss)]

pub mod dataset;
pub mod error;
pub mod grid;
pub mod kfold;
pub mod logging;
pub mod model;
pub mod params;
pub mod partition;
pub mod record;
pub mod repeated;
pub mod stats;

pub use dataset::Dataset;
pub use error::{Error, Result};
pub use grid::{
    ComboScore, ExhaustiveGridSearch, GridSearch, GridSearchOptions, GridSearchRunner,
    SearchOutcome,
};
pub use kfold::{KFoldExperimentRunner, KFoldOptions};
pub use model::{evaluate_all_depths, DepthScore};
pub use params::{ParamGrid, ParameterSet};
pub use partition::{k_fold, stratified_k_fold, Fold};
pub use record::{
    ExperimentRecord, ExperimentRecorder, JsonDirRecorder, NullRecorder, TrialResult,
};
pub use repeated::RepeatedShuffleEvaluator;
