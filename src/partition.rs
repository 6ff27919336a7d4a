//! Stratified and plain k-fold partitioning
//!
//! Partitioning is a pure function of `(labels, fold_count, seed)`: identical
//! inputs always reproduce identical fold membership. Test portions are
//! mutually exclusive and collectively exhaustive, and each fold's test
//! portion preserves global class proportions within one sample of rounding.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One train/test split of a k-fold partition.
///
/// Index sets are disjoint, sorted, and together cover the full index range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    train_indices: Vec<usize>,
    test_indices: Vec<usize>,
}

impl Fold {
    /// Get the training index set.
    #[must_use]
    pub fn train_indices(&self) -> &[usize] {
        &self.train_indices
    }

    /// Get the held-out test index set.
    #[must_use]
    pub fn test_indices(&self) -> &[usize] {
        &self.test_indices
    }
}

/// Partition `labels` into `fold_count` stratified folds.
///
/// Each class's indices are shuffled with a seeded RNG and dealt round-robin
/// into fold test sets, so every fold's test portion receives either
/// `floor(count / fold_count)` or `ceil(count / fold_count)` members of each
/// class.
///
/// # Errors
///
/// * [`Error::InvalidFoldCount`] when `fold_count < 2`
/// * [`Error::InsufficientClassSamples`] when any class has fewer than
///   `fold_count` members
pub fn stratified_k_fold(labels: &[i64], fold_count: usize, seed: u64) -> Result<Vec<Fold>> {
    if fold_count < 2 {
        return Err(Error::InvalidFoldCount(fold_count));
    }

    let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (index, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(index);
    }
    for (&label, members) in &by_class {
        if members.len() < fold_count {
            return Err(Error::InsufficientClassSamples {
                label,
                count: members.len(),
                fold_count,
            });
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut test_sets: Vec<Vec<usize>> = vec![Vec::new(); fold_count];
    for members in by_class.into_values() {
        let mut members = members;
        members.shuffle(&mut rng);
        for (position, index) in members.into_iter().enumerate() {
            test_sets[position % fold_count].push(index);
        }
    }

    Ok(assemble(labels.len(), test_sets))
}

/// Partition `len` indices into `fold_count` contiguous folds.
///
/// No shuffling and no stratification; the first `len % fold_count` folds
/// hold one extra test sample. Used for plain cross-validation over an
/// already-shuffled dataset.
///
/// # Errors
///
/// * [`Error::InvalidFoldCount`] when `fold_count < 2`
/// * [`Error::InvalidDatasetShape`] when there are fewer samples than folds
pub fn k_fold(len: usize, fold_count: usize) -> Result<Vec<Fold>> {
    if fold_count < 2 {
        return Err(Error::InvalidFoldCount(fold_count));
    }
    if len < fold_count {
        return Err(Error::InvalidDatasetShape(format!(
            "{len} samples cannot fill {fold_count} folds"
        )));
    }

    let base = len / fold_count;
    let extra = len % fold_count;
    let mut test_sets = Vec::with_capacity(fold_count);
    let mut cursor = 0;
    for fold in 0..fold_count {
        let size = base + usize::from(fold < extra);
        test_sets.push((cursor..cursor + size).collect());
        cursor += size;
    }

    Ok(assemble(len, test_sets))
}

/// Build sorted, complementary train/test folds from per-fold test sets.
fn assemble(len: usize, test_sets: Vec<Vec<usize>>) -> Vec<Fold> {
    test_sets
        .into_iter()
        .map(|mut test_indices| {
            test_indices.sort_unstable();
            let mut held_out = vec![false; len];
            for &index in &test_indices {
                held_out[index] = true;
            }
            let train_indices = (0..len).filter(|&i| !held_out[i]).collect();
            Fold {
                train_indices,
                test_indices,
            }
        })
        .collect()
}
