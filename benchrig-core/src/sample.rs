//! Sample Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Metric values recorded for one run of a benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureValues {
    /// Zero-based index of the run within the sample
    pub run_index: usize,
    /// When the run finished
    pub timestamp: DateTime<Utc>,
    /// Metric name to measured value
    pub values: BTreeMap<String, f64>,
}

impl MeasureValues {
    /// Value of a single metric
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied()
    }
}

/// What was measured and under which conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleDescription {
    /// Sample identifier (also the report file prefix)
    pub id: String,
    /// Free-form description merged from runner defaults, the validator and
    /// the request
    pub description: BTreeMap<String, Value>,
    /// Metric name to human-readable description
    pub metrics: BTreeMap<String, String>,
}

/// Outcome of a completed sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleState {
    /// Every run performed, in order
    pub completed: Vec<MeasureValues>,
    /// The window the validator accepted
    pub valid: Vec<MeasureValues>,
}

impl SampleState {
    /// Values of `metric` across the valid window
    pub fn valid_values(&self, metric: &str) -> Vec<f64> {
        self.valid.iter().filter_map(|m| m.get(metric)).collect()
    }
}
