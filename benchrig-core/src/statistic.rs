//! Sample Statistics
//!
//! Just enough statistics to summarise a valid sample and to drive the
//! regression-slope validator. Heavier analysis belongs to report tooling.

/// Summary of one metric across a sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricSummary {
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std_dev: f64,
    /// Standard deviation relative to the mean, in percent
    pub coefficient_of_variation: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Number of values
    pub count: usize,
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation around `mean`; 0.0 for fewer than two values
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Coefficient of variation in percent; 0.0 when the mean is zero
pub fn coefficient_of_variation(std_dev: f64, mean: f64) -> f64 {
    if mean == 0.0 {
        0.0
    } else {
        (std_dev / mean) * 100.0
    }
}

/// Least-squares slope of `ys` over `xs`.
///
/// Returns 0.0 when the x values have no spread (fewer than two points).
pub fn regression_slope(xs: &[f64], x_mean: f64, ys: &[f64], y_mean: f64) -> f64 {
    let mut dividend = 0.0;
    let mut divisor = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        dividend += (x - x_mean) * (y - y_mean);
        divisor += (x - x_mean).powi(2);
    }
    if divisor == 0.0 {
        0.0
    } else {
        dividend / divisor
    }
}

/// Compute a [`MetricSummary`]
pub fn summarize(values: &[f64]) -> MetricSummary {
    if values.is_empty() {
        return MetricSummary::default();
    }

    let mean = mean(values);
    let std_dev = std_dev(values, mean);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    MetricSummary {
        mean,
        std_dev,
        coefficient_of_variation: coefficient_of_variation(std_dev, mean),
        min,
        max,
        count: values.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_summary() {
        let summary = summarize(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert!((summary.mean - 3.0).abs() < 0.01);
        assert!((summary.std_dev - 1.5811).abs() < 0.001);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert_eq!(summary.count, 5);
    }

    #[test]
    fn test_constant_values_have_zero_cv() {
        let summary = summarize(&[100.0, 100.0, 100.0, 100.0]);
        assert!((summary.coefficient_of_variation - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_values() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
        assert!((summary.mean - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_mean_cv() {
        assert_eq!(coefficient_of_variation(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_regression_slope() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let rising = [1.0, 3.0, 5.0, 7.0];
        let falling = [7.0, 5.0, 3.0, 1.0];

        assert!((regression_slope(&xs, mean(&xs), &rising, mean(&rising)) - 2.0).abs() < 1e-9);
        assert!((regression_slope(&xs, mean(&xs), &falling, mean(&falling)) + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_regression_slope_single_point() {
        assert_eq!(regression_slope(&[0.0], 0.0, &[5.0], 5.0), 0.0);
    }
}
