//! Labeled dataset model
//!
//! The harness borrows a `Dataset` read-only for the duration of a run; the
//! feature matrix and target vector are index-aligned and validated once at
//! construction so every downstream component can assume a rectangular,
//! non-empty shape.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An immutable labeled dataset.
///
/// `features` and `targets` are index-aligned; `n_dim` is the feature vector
/// width and `n_class` the number of distinct labels, both inferred at
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    name: String,
    features: Vec<Vec<f64>>,
    targets: Vec<i64>,
    n_dim: usize,
    n_class: usize,
}

impl Dataset {
    /// Create a dataset, validating its shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDatasetShape`] when the dataset is empty, the
    /// feature matrix and target vector have different lengths, or any
    /// feature row differs in width from the first.
    pub fn new(
        name: impl Into<String>,
        features: Vec<Vec<f64>>,
        targets: Vec<i64>,
    ) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::InvalidDatasetShape(
                "empty feature matrix".to_string(),
            ));
        }
        if features.len() != targets.len() {
            return Err(Error::InvalidDatasetShape(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }
        let n_dim = features[0].len();
        if let Some(row) = features.iter().position(|r| r.len() != n_dim) {
            return Err(Error::InvalidDatasetShape(format!(
                "ragged feature matrix: row {row} has {} columns, expected {n_dim}",
                features[row].len()
            )));
        }
        let n_class = targets.iter().collect::<BTreeSet<_>>().len();
        Ok(Self {
            name: name.into(),
            features,
            targets,
            n_dim,
            n_class,
        })
    }

    /// Get the dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the feature matrix.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Get the target vector.
    #[must_use]
    pub fn targets(&self) -> &[i64] {
        &self.targets
    }

    /// Get the feature vector width.
    #[must_use]
    pub const fn n_dim(&self) -> usize {
        self.n_dim
    }

    /// Get the number of distinct class labels.
    #[must_use]
    pub const fn n_class(&self) -> usize {
        self.n_class
    }

    /// Get the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check whether the dataset holds no samples.
    ///
    /// Always `false` for a constructed dataset; construction rejects empty
    /// data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Copy the rows at `indices`, preserving feature/target alignment.
    ///
    /// Indices are expected to come from a fold over this dataset; an
    /// out-of-range index panics.
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> (Vec<Vec<f64>>, Vec<i64>) {
        let features = indices.iter().map(|&i| self.features[i].clone()).collect();
        let targets = indices.iter().map(|&i| self.targets[i]).collect();
        (features, targets)
    }

    /// Return a copy with rows in a new seeded random order.
    ///
    /// Row/label pairing is preserved; identical seeds yield identical
    /// orderings.
    #[must_use]
    pub fn shuffled(&self, seed: u64) -> Self {
        let mut order: Vec<usize> = (0..self.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
        let (features, targets) = self.subset(&order);
        Self {
            name: self.name.clone(),
            features,
            targets,
            n_dim: self.n_dim,
            n_class: self.n_class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Dataset {
        Dataset::new(
            "toy",
            vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 2.0], vec![3.0, 1.0]],
            vec![0, 1, 0, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_inference() {
        let data = toy();
        assert_eq!(data.len(), 4);
        assert_eq!(data.n_dim(), 2);
        assert_eq!(data.n_class(), 2);
        assert!(!data.is_empty());
    }

    #[test]
    fn test_empty_rejected() {
        let err = Dataset::new("bad", vec![], vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidDatasetShape(_)));
    }

    #[test]
    fn test_misaligned_rejected() {
        let err = Dataset::new("bad", vec![vec![1.0]], vec![0, 1]).unwrap_err();
        assert!(matches!(err, Error::InvalidDatasetShape(_)));
    }

    #[test]
    fn test_ragged_rejected() {
        let err =
            Dataset::new("bad", vec![vec![1.0, 2.0], vec![1.0]], vec![0, 1]).unwrap_err();
        assert!(matches!(err, Error::InvalidDatasetShape(_)));
    }

    #[test]
    fn test_subset_alignment() {
        let data = toy();
        let (features, targets) = data.subset(&[2, 0]);
        assert_eq!(features, vec![vec![2.0, 2.0], vec![0.0, 1.0]]);
        assert_eq!(targets, vec![0, 0]);
    }

    #[test]
    fn test_shuffled_deterministic_and_aligned() {
        let data = toy();
        let a = data.shuffled(7);
        let b = data.shuffled(7);
        assert_eq!(a, b);
        // Pairing survives the permutation: label 0 rows have even first
        // feature values in the toy data.
        for (row, &label) in a.features().iter().zip(a.targets()) {
            let expected = if row[0] as i64 % 2 == 0 { 0 } else { 1 };
            assert_eq!(label, expected);
        }
    }
}
