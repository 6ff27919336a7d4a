//! Statistical aggregation over fold/try score series
//!
//! Mean and standard deviation are order-invariant, so fold and try execution
//! order never affects aggregated results. Standard deviation is the
//! population form (divide by `n`, not `n - 1`), matching the aggregation
//! semantics the experiment records were defined against.

/// Arithmetic mean. `NaN` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. `NaN` for an empty slice.
#[must_use]
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let center = mean(values);
    let variance = values
        .iter()
        .map(|v| {
            let dev = v - center;
            dev * dev
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Flatten a fold×try series into one score vector.
#[must_use]
pub fn flatten(series: &[Vec<f64>]) -> Vec<f64> {
    series.iter().flatten().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_fold_try_series() {
        let series = vec![vec![0.8, 0.9], vec![0.7, 0.6]];
        let flat = flatten(&series);
        assert!((mean(&flat) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_population_std_of_fold_try_series() {
        let flat = [0.8, 0.9, 0.7, 0.6];
        // sqrt(((0.05)^2 + (0.15)^2 + (0.05)^2 + (0.15)^2) / 4)
        assert!((population_std(&flat) - 0.111_803_398_874_989_5).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_has_zero_std() {
        assert!(population_std(&[0.5, 0.5, 0.5]).abs() < 1e-12);
    }

    #[test]
    fn test_empty_slices_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(population_std(&[]).is_nan());
    }
}
