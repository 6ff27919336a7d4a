//! Error types for foldwise
//!
//! Validation errors fail fast before any partitioning; mid-run training
//! errors abort the whole run with fold/try coordinates attached; persistence
//! errors are kept separate from computation errors so a failed write never
//! masks a completed experiment.

use thiserror::Error;

use crate::record::ExperimentRecord;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Foldwise error types
#[derive(Error, Debug)]
pub enum Error {
    /// Dataset is missing required structure (empty, ragged rows, or
    /// misaligned feature/target lengths)
    #[error("invalid dataset shape: {0}")]
    InvalidDatasetShape(String),

    /// A class has fewer members than the requested fold count, so a
    /// stratified partition cannot place it in every fold
    #[error(
        "insufficient samples for class {label}: {count} present, \
         {fold_count} folds requested"
    )]
    InsufficientClassSamples {
        /// Class label with too few members
        label: i64,
        /// Number of samples carrying that label
        count: usize,
        /// Requested fold count
        fold_count: usize,
    },

    /// Fold count below the minimum of 2
    #[error("fold count must be at least 2, got {0}")]
    InvalidFoldCount(usize),

    /// A fit or predict error during a fold/try; aborts the run with no
    /// partial persistence
    #[error("training failure at fold {fold}, try {try_index}: {source}")]
    Training {
        /// Fold index of the failing unit
        fold: usize,
        /// Try index within the fold (or repeat index for shuffle runs)
        try_index: usize,
        /// Underlying collaborator error
        #[source]
        source: anyhow::Error,
    },

    /// Propagated unmodified from the grid-search utility
    #[error("grid search failure: {0}")]
    Search(#[source] anyhow::Error),

    /// Storage collaborator error; the computed record is carried so the
    /// caller can still use it ("the experiment ran" vs "the experiment was
    /// durably recorded")
    #[error("persistence failure: {source}")]
    Persistence {
        /// Underlying recorder error
        #[source]
        source: Box<Error>,
        /// The record that could not be persisted
        record: Box<ExperimentRecord>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Recover the computed record from a persistence failure.
    ///
    /// Returns `None` for every other variant.
    #[must_use]
    pub fn into_record(self) -> Option<ExperimentRecord> {
        match self {
            Self::Persistence { record, .. } => Some(*record),
            _ => None,
        }
    }
}
