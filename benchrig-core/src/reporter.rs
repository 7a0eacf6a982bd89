//! Reporters
//!
//! Reporters observe a sample as it runs: every run's values, then the final
//! accepted window. [`JsonFileReporter`] is the runner's only consumer of
//! `WRITE_FILE`.
//!
//! ```text
//! Sampler ──► MultiReporter ──┬──► ConsoleReporter   (tracing)
//!                             └──► JsonFileReporter  (WRITE_FILE)
//! ```

use crate::clock::Clock;
use crate::error::RunnerError;
use crate::sample::{MeasureValues, SampleDescription};
use crate::statistic::summarize;
use crate::write_file::FileWriter;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Observer of sample progress
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Called after every run
    async fn report_measure_values(&self, values: &MeasureValues) -> Result<(), RunnerError>;

    /// Called once, when the validator accepts a window
    async fn report_sample(
        &self,
        completed: &[MeasureValues],
        valid: &[MeasureValues],
    ) -> Result<(), RunnerError>;
}

/// Logs runs and the final summary through `tracing`
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    description: SampleDescription,
}

impl ConsoleReporter {
    /// Reporter for the sample described by `description`
    pub fn new(description: SampleDescription) -> Self {
        Self { description }
    }
}

#[async_trait]
impl Reporter for ConsoleReporter {
    async fn report_measure_values(&self, values: &MeasureValues) -> Result<(), RunnerError> {
        tracing::debug!(
            sample = %self.description.id,
            run = values.run_index,
            values = ?values.values,
            "run complete"
        );
        Ok(())
    }

    async fn report_sample(
        &self,
        completed: &[MeasureValues],
        valid: &[MeasureValues],
    ) -> Result<(), RunnerError> {
        let metrics: BTreeSet<&str> = valid
            .iter()
            .flat_map(|m| m.values.keys().map(String::as_str))
            .collect();

        for metric in metrics {
            let values: Vec<f64> = valid.iter().filter_map(|m| m.get(metric)).collect();
            let summary = summarize(&values);
            tracing::info!(
                sample = %self.description.id,
                runs = completed.len(),
                "{}: {:.3} ± {:.1}% (n={})",
                metric,
                summary.mean,
                summary.coefficient_of_variation,
                summary.count
            );
        }
        Ok(())
    }
}

/// Body of a JSON sample report
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    description: &'a SampleDescription,
    complete_sample: &'a [MeasureValues],
    valid_sample: &'a [MeasureValues],
}

/// Writes the finished sample as `<directory>/<id>_<millis>.json`
pub struct JsonFileReporter {
    description: SampleDescription,
    directory: PathBuf,
    writer: Arc<dyn FileWriter>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JsonFileReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileReporter")
            .field("sample", &self.description.id)
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}

impl JsonFileReporter {
    /// Reporter writing into `directory` through `writer`
    pub fn new(
        description: SampleDescription,
        directory: impl Into<PathBuf>,
        writer: Arc<dyn FileWriter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            description,
            directory: directory.into(),
            writer,
            clock,
        }
    }

    /// Path the report is written to at the current `NOW`
    pub fn report_path(&self) -> PathBuf {
        let millis = self.clock.now().timestamp_millis();
        self.directory
            .join(format!("{}_{}.json", self.description.id, millis))
    }
}

#[async_trait]
impl Reporter for JsonFileReporter {
    async fn report_measure_values(&self, _values: &MeasureValues) -> Result<(), RunnerError> {
        Ok(())
    }

    async fn report_sample(
        &self,
        completed: &[MeasureValues],
        valid: &[MeasureValues],
    ) -> Result<(), RunnerError> {
        let report = JsonReport {
            description: &self.description,
            complete_sample: completed,
            valid_sample: valid,
        };
        let content = serde_json::to_string_pretty(&report)?;
        let path = self.report_path();

        if let Err(err) = self.writer.write_file(&path, content.as_bytes()).await {
            tracing::warn!(
                sample = %self.description.id,
                path = %err.path().display(),
                cause = %err.kind(),
                "report write failed"
            );
            return Err(err.into());
        }
        tracing::debug!(sample = %self.description.id, path = %path.display(), "report written");
        Ok(())
    }
}

/// Fans each call out to every inner reporter concurrently.
///
/// Completes when all inner calls complete; the first failure is returned.
#[derive(Default)]
pub struct MultiReporter {
    reporters: Vec<Box<dyn Reporter>>,
}

impl MultiReporter {
    /// Empty fan-out
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reporter
    pub fn push(&mut self, reporter: impl Reporter + 'static) {
        self.reporters.push(Box::new(reporter));
    }

    /// Number of inner reporters
    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    /// Whether there are no inner reporters
    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

#[async_trait]
impl Reporter for MultiReporter {
    async fn report_measure_values(&self, values: &MeasureValues) -> Result<(), RunnerError> {
        try_join_all(
            self.reporters
                .iter()
                .map(|r| r.report_measure_values(values)),
        )
        .await?;
        Ok(())
    }

    async fn report_sample(
        &self,
        completed: &[MeasureValues],
        valid: &[MeasureValues],
    ) -> Result<(), RunnerError> {
        try_join_all(
            self.reporters
                .iter()
                .map(|r| r.report_sample(completed, valid)),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::write_file::{MemoryFileWriter, WriteFailure, write_file_fn};
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::path::Path;

    fn description() -> SampleDescription {
        SampleDescription {
            id: "parse".to_string(),
            ..Default::default()
        }
    }

    fn run(index: usize, value: f64) -> MeasureValues {
        MeasureValues {
            run_index: index,
            timestamp: Utc::now(),
            values: BTreeMap::from([("wallTimeMs".to_string(), value)]),
        }
    }

    #[tokio::test]
    async fn test_json_reporter_writes_once() {
        let store = Arc::new(MemoryFileWriter::new());
        let reporter = JsonFileReporter::new(
            description(),
            "reports",
            store.clone(),
            Arc::new(FixedClock::from_millis(1000)),
        );
        let runs = vec![run(0, 1.0), run(1, 2.0)];

        reporter.report_measure_values(&runs[0]).await.unwrap();
        assert!(store.is_empty());

        reporter.report_sample(&runs, &runs[1..]).await.unwrap();
        let content = store.get(Path::new("reports").join("parse_1000.json")).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&content).unwrap();

        assert_eq!(json["description"]["id"], "parse");
        assert_eq!(json["completeSample"].as_array().unwrap().len(), 2);
        assert_eq!(json["validSample"].as_array().unwrap().len(), 1);
        assert_eq!(json["validSample"][0]["runIndex"], 1);
    }

    #[tokio::test]
    async fn test_json_reporter_propagates_write_failure() {
        let failing = write_file_fn(|path, _content| async move {
            Err(WriteFailure::io(
                path,
                std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
            ))
        });
        let reporter = JsonFileReporter::new(
            description(),
            "reports",
            Arc::new(failing),
            Arc::new(FixedClock::from_millis(0)),
        );

        let err = reporter.report_sample(&[], &[]).await.unwrap_err();
        assert!(matches!(err, RunnerError::Write(_)));
    }

    #[tokio::test]
    async fn test_multi_reporter_fans_out() {
        let a = Arc::new(MemoryFileWriter::new());
        let b = Arc::new(MemoryFileWriter::new());
        let clock = Arc::new(FixedClock::from_millis(7));

        let mut multi = MultiReporter::new();
        multi.push(ConsoleReporter::new(description()));
        multi.push(JsonFileReporter::new(description(), "a", a.clone(), clock.clone()));
        multi.push(JsonFileReporter::new(description(), "b", b.clone(), clock));
        assert_eq!(multi.len(), 3);

        let runs = vec![run(0, 1.0)];
        multi.report_sample(&runs, &runs).await.unwrap();

        assert_eq!(a.paths(), vec![Path::new("a").join("parse_7.json")]);
        assert_eq!(b.paths(), vec![Path::new("b").join("parse_7.json")]);
    }
}
