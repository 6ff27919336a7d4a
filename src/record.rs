//! Experiment records and the persistence collaborator seam
//!
//! An [`ExperimentRecord`] is the `{config, results, monitors}` triple
//! describing one orchestration run: `config` is populated before execution,
//! `results` holds summary scalars, and `monitors` holds raw per-fold/per-try
//! series. Records are handed to an [`ExperimentRecorder`] at run end and
//! never read back by the harness.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Structured record of one experiment run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentRecord {
    name: String,
    created_at: DateTime<Utc>,
    config: Map<String, Value>,
    results: Map<String, Value>,
    monitors: Map<String, Value>,
}

impl ExperimentRecord {
    /// Create an empty record with the current timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now(),
            config: Map::new(),
            results: Map::new(),
            monitors: Map::new(),
        }
    }

    /// Get the experiment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Set a configuration entry. Config is write-once by convention:
    /// orchestrators populate it before the fold loop starts.
    pub fn set_config(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.config.insert(key.into(), value.into());
    }

    /// Set a summary result entry.
    pub fn set_result(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.results.insert(key.into(), value.into());
    }

    /// Set a diagnostic monitor entry.
    pub fn set_monitor(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.monitors.insert(key.into(), value.into());
    }

    /// Get the configuration block.
    #[must_use]
    pub const fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Get the results block.
    #[must_use]
    pub const fn results(&self) -> &Map<String, Value> {
        &self.results
    }

    /// Get the monitors block.
    #[must_use]
    pub const fn monitors(&self) -> &Map<String, Value> {
        &self.monitors
    }

    /// Look up a single result entry.
    #[must_use]
    pub fn result(&self, key: &str) -> Option<&Value> {
        self.results.get(key)
    }

    /// Look up a single monitor entry.
    #[must_use]
    pub fn monitor(&self, key: &str) -> Option<&Value> {
        self.monitors.get(key)
    }
}

/// Outcome of one `(fold, try)` training/evaluation unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialResult {
    /// Fold index.
    pub fold: usize,
    /// Try index within the fold.
    pub try_index: usize,
    /// Fit wall time in seconds.
    pub train_time: f64,
    /// Evaluation wall time in seconds.
    pub test_time: f64,
    /// Best-scoring depth on the held-out set.
    pub best_depth: usize,
    /// Accuracy at the best depth.
    pub accuracy: f64,
    /// Reduced model state, when retention is enabled.
    pub compressed_model: Option<Value>,
}

/// Persistence collaborator: durably stores a record under a derived key.
///
/// Consumed fire-and-forget; the harness never reads records back.
pub trait ExperimentRecorder {
    /// Persist `record` under `key`.
    ///
    /// # Errors
    ///
    /// Storage errors surface to the orchestrator, which wraps them as a
    /// persistence failure carrying the computed record.
    fn record(&self, record: &ExperimentRecord, key: &str) -> Result<()>;
}

/// Recorder that writes one pretty-printed JSON file per record under
/// `root/key/`.
#[derive(Debug, Clone)]
pub struct JsonDirRecorder {
    root: PathBuf,
}

impl JsonDirRecorder {
    /// Create a recorder rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn sanitize(name: &str) -> String {
        name.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    }
}

impl ExperimentRecorder for JsonDirRecorder {
    fn record(&self, record: &ExperimentRecord, key: &str) -> Result<()> {
        let dir = self.root.join(Self::sanitize(key));
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", Self::sanitize(record.name())));
        let content = serde_json::to_string_pretty(record)?;
        // Atomic write: the record either lands whole or not at all.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Recorder that discards records; for lightweight runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecorder;

impl ExperimentRecorder for NullRecorder {
    fn record(&self, _record: &ExperimentRecord, _key: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_blocks() {
        let mut record = ExperimentRecord::new("exp");
        record.set_config("n_folds", 5);
        record.set_result("mean_acc", 0.9);
        record.set_monitor("acc_fold", json!([[0.9]]));

        assert_eq!(record.name(), "exp");
        assert_eq!(record.config().get("n_folds"), Some(&json!(5)));
        assert_eq!(record.result("mean_acc"), Some(&json!(0.9)));
        assert_eq!(record.monitor("acc_fold"), Some(&json!([[0.9]])));
        assert!(record.result("missing").is_none());
    }

    #[test]
    fn test_record_json_round_trip() {
        let mut record = ExperimentRecord::new("exp");
        record.set_config("seed", 7);
        record.set_result("mean_acc", 0.5);

        let text = serde_json::to_string(&record).unwrap();
        let back: ExperimentRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_json_dir_recorder_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = JsonDirRecorder::new(dir.path());

        let mut record = ExperimentRecord::new("run one");
        record.set_result("mean_acc", 0.75);
        recorder.record(&record, "exp_r2svm_iris").unwrap();

        let path = dir.path().join("exp_r2svm_iris").join("run-one.json");
        let content = fs::read_to_string(path).unwrap();
        let back: ExperimentRecord = serde_json::from_str(&content).unwrap();
        assert_eq!(back.result("mean_acc"), Some(&json!(0.75)));
    }

    #[test]
    fn test_null_recorder_is_infallible() {
        let record = ExperimentRecord::new("exp");
        assert!(NullRecorder.record(&record, "anywhere").is_ok());
    }
}
