//! Sample Validators
//!
//! After every run the sampler asks the validator whether the runs so far
//! contain a usable window. The first window accepted ends the sample.

use crate::sample::MeasureValues;
use crate::statistic::{mean, regression_slope};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Default window size for both validators
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Decides when a sample is complete
pub trait Validator: Send + Sync {
    /// The accepted window, or `None` to keep sampling
    fn validate(&self, completed: &[MeasureValues]) -> Option<Vec<MeasureValues>>;

    /// Settings merged into the sample description
    fn describe(&self) -> BTreeMap<String, Value>;
}

/// Accepts the latest `sample_size` runs as soon as there are that many
#[derive(Debug, Clone)]
pub struct SizeValidator {
    sample_size: usize,
}

impl SizeValidator {
    /// Window of `sample_size` runs (at least one)
    pub fn new(sample_size: usize) -> Self {
        Self {
            sample_size: sample_size.max(1),
        }
    }

    /// Configured window size
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }
}

impl Default for SizeValidator {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_SIZE)
    }
}

impl Validator for SizeValidator {
    fn validate(&self, completed: &[MeasureValues]) -> Option<Vec<MeasureValues>> {
        latest_window(completed, self.sample_size)
    }

    fn describe(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([("sampleSize".to_string(), json!(self.sample_size))])
    }
}

/// Accepts the latest `sample_size` runs once `metric` stops trending down.
///
/// A negative slope means the benchmark is still warming up (JIT, caches);
/// a flat or rising slope means the window is usable. A window in which any
/// run lacks `metric` is never accepted.
#[derive(Debug, Clone)]
pub struct RegressionSlopeValidator {
    sample_size: usize,
    metric: String,
}

impl RegressionSlopeValidator {
    /// Window of `sample_size` runs judged on `metric`
    pub fn new(sample_size: usize, metric: impl Into<String>) -> Self {
        Self {
            sample_size: sample_size.max(1),
            metric: metric.into(),
        }
    }

    /// Metric whose trend is checked
    pub fn metric(&self) -> &str {
        &self.metric
    }
}

impl Validator for RegressionSlopeValidator {
    fn validate(&self, completed: &[MeasureValues]) -> Option<Vec<MeasureValues>> {
        let window = latest_window(completed, self.sample_size)?;

        let xs: Vec<f64> = (0..window.len()).map(|i| i as f64).collect();
        let ys: Vec<f64> = window
            .iter()
            .map(|m| m.get(&self.metric))
            .collect::<Option<_>>()?;

        let slope = regression_slope(&xs, mean(&xs), &ys, mean(&ys));
        (slope >= 0.0).then_some(window)
    }

    fn describe(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("sampleSize".to_string(), json!(self.sample_size)),
            ("regressionSlopeMetric".to_string(), json!(self.metric)),
        ])
    }
}

fn latest_window(completed: &[MeasureValues], size: usize) -> Option<Vec<MeasureValues>> {
    (completed.len() >= size).then(|| completed[completed.len() - size..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn runs(values: &[f64]) -> Vec<MeasureValues> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MeasureValues {
                run_index: i,
                timestamp: Utc::now(),
                values: BTreeMap::from([("script".to_string(), *v)]),
            })
            .collect()
    }

    #[test]
    fn test_size_validator_waits_for_window() {
        let validator = SizeValidator::new(3);

        assert!(validator.validate(&runs(&[1.0, 2.0])).is_none());

        let window = validator.validate(&runs(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        let indices: Vec<_> = window.iter().map(|m| m.run_index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_size_validator_minimum_one() {
        assert_eq!(SizeValidator::new(0).sample_size(), 1);
    }

    #[test]
    fn test_slope_rejects_decreasing_window() {
        let validator = RegressionSlopeValidator::new(3, "script");
        assert!(validator.validate(&runs(&[5.0, 4.0, 3.0])).is_none());
    }

    #[test]
    fn test_slope_accepts_flat_or_rising_window() {
        let validator = RegressionSlopeValidator::new(3, "script");

        assert!(validator.validate(&runs(&[2.0, 2.0, 2.0])).is_some());
        let window = validator.validate(&runs(&[9.0, 1.0, 2.0, 3.0])).unwrap();
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].run_index, 1);
    }

    #[test]
    fn test_slope_rejects_missing_metric() {
        let warming_up = runs(&[9.0, 5.0, 1.0]);
        let flat = runs(&[2.0, 2.0, 2.0]);

        assert!(RegressionSlopeValidator::new(3, "script").validate(&warming_up).is_none());
        assert!(RegressionSlopeValidator::new(3, "Script").validate(&warming_up).is_none());
        assert!(RegressionSlopeValidator::new(3, "Script").validate(&flat).is_none());
    }

    #[test]
    fn test_describe() {
        let description = RegressionSlopeValidator::new(4, "script").describe();
        assert_eq!(description["sampleSize"], json!(4));
        assert_eq!(description["regressionSlopeMetric"], json!("script"));
    }
}
