//! Property-based tests for partition invariants
//!
//! - Test mathematical invariants of the stratified partitioner
//! - Run with ProptestConfig::with_cases(100)

use std::collections::BTreeMap;

use proptest::prelude::*;

use foldwise::stratified_k_fold;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate `(labels, fold_count)` where every class has at least
/// `fold_count` members.
fn arb_labels_and_folds() -> impl Strategy<Value = (Vec<i64>, usize)> {
    (2usize..6).prop_flat_map(|fold_count| {
        let class_counts = proptest::collection::vec(fold_count..fold_count + 20, 2..5);
        class_counts.prop_map(move |counts| {
            let mut labels = Vec::new();
            for (class, count) in counts.into_iter().enumerate() {
                labels.extend(std::iter::repeat(class as i64 * 3 - 1).take(count));
            }
            (labels, fold_count)
        })
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: test sets cover the full index range exactly once
    #[test]
    fn prop_partition_exhaustive_and_disjoint(
        (labels, fold_count) in arb_labels_and_folds(),
        seed in any::<u64>()
    ) {
        let folds = stratified_k_fold(&labels, fold_count, seed).unwrap();
        prop_assert_eq!(folds.len(), fold_count);

        let mut held_out_count = vec![0usize; labels.len()];
        for fold in &folds {
            for &index in fold.test_indices() {
                held_out_count[index] += 1;
            }
        }
        prop_assert!(held_out_count.iter().all(|&n| n == 1));
    }

    /// Property: train and test portions of each fold are complementary
    #[test]
    fn prop_fold_portions_complementary(
        (labels, fold_count) in arb_labels_and_folds(),
        seed in any::<u64>()
    ) {
        let folds = stratified_k_fold(&labels, fold_count, seed).unwrap();
        for fold in &folds {
            prop_assert_eq!(
                fold.train_indices().len() + fold.test_indices().len(),
                labels.len()
            );
            for &index in fold.train_indices() {
                prop_assert!(!fold.test_indices().contains(&index));
            }
        }
    }

    /// Property: identical inputs reproduce identical fold membership
    #[test]
    fn prop_partition_deterministic(
        (labels, fold_count) in arb_labels_and_folds(),
        seed in any::<u64>()
    ) {
        let first = stratified_k_fold(&labels, fold_count, seed).unwrap();
        let second = stratified_k_fold(&labels, fold_count, seed).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: each fold's class share differs from the global share by at
    /// most one sample of rounding (floor/ceil of count / fold_count)
    #[test]
    fn prop_stratification_within_rounding(
        (labels, fold_count) in arb_labels_and_folds(),
        seed in any::<u64>()
    ) {
        let mut global: BTreeMap<i64, usize> = BTreeMap::new();
        for &label in &labels {
            *global.entry(label).or_default() += 1;
        }

        let folds = stratified_k_fold(&labels, fold_count, seed).unwrap();
        for fold in &folds {
            let mut local: BTreeMap<i64, usize> = BTreeMap::new();
            for &index in fold.test_indices() {
                *local.entry(labels[index]).or_default() += 1;
            }
            for (&label, &count) in &global {
                let share = local.get(&label).copied().unwrap_or(0);
                let floor = count / fold_count;
                let ceil = count.div_ceil(fold_count);
                prop_assert!(
                    (floor..=ceil).contains(&share),
                    "class {} share {} outside [{}, {}]",
                    label, share, floor, ceil
                );
            }
        }
    }
}
