//! Metrics
//!
//! A metric brackets each run with `begin_measure`/`end_measure` and reports
//! named values. Only wall-clock time is provided here; richer instrumentation
//! plugs in through the [`Metric`] trait.

use std::collections::BTreeMap;
use std::time::Instant;

/// Name of the value produced by [`WallClockMetric`]
pub const WALL_TIME_METRIC: &str = "wallTimeMs";

/// Measurement bracketing a single benchmark run
pub trait Metric: Send {
    /// Start measuring
    fn begin_measure(&mut self);

    /// Stop measuring and return the values for this run
    fn end_measure(&mut self) -> BTreeMap<String, f64>;

    /// Metric name to human-readable description
    fn describe(&self) -> BTreeMap<String, String>;
}

/// Elapsed wall-clock time in milliseconds
#[derive(Debug, Default)]
pub struct WallClockMetric {
    started: Option<Instant>,
}

impl WallClockMetric {
    /// Create an idle metric
    pub fn new() -> Self {
        Self::default()
    }
}

impl Metric for WallClockMetric {
    #[inline(always)]
    fn begin_measure(&mut self) {
        self.started = Some(Instant::now());
    }

    #[inline(always)]
    fn end_measure(&mut self) -> BTreeMap<String, f64> {
        // An unmatched end reports zero rather than a bogus duration
        let elapsed_ms = self
            .started
            .take()
            .map(|start| start.elapsed().as_nanos() as f64 / 1_000_000.0)
            .unwrap_or(0.0);

        BTreeMap::from([(WALL_TIME_METRIC.to_string(), elapsed_ms)])
    }

    fn describe(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(
            WALL_TIME_METRIC.to_string(),
            "wall-clock time of one run in ms".to_string(),
        )])
    }
}
