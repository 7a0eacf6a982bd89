//! Sampling Loop
//!
//! ```text
//!   ┌──────────────────────────────────────────────┐
//!   │ prepare (untimed, optional)                  │
//!   │ metric.begin → execute → metric.end          │
//!   │ reporter.report_measure_values     (await)   │
//!   │ validator.validate(completed)                │
//!   └──────────────┬───────────────────────────────┘
//!          valid?  │ no: loop (up to max_samples)
//!                  ▼ yes
//!   reporter.report_sample(completed, valid)  (await)
//! ```
//!
//! Execution is synchronous; the loop only suspends inside reporters.

use crate::clock::Clock;
use crate::error::RunnerError;
use crate::metric::Metric;
use crate::reporter::Reporter;
use crate::sample::{MeasureValues, SampleState};
use crate::validator::Validator;
use std::sync::Arc;

/// Benchmark body or preparation step
pub type Routine<'a> = Box<dyn FnMut() + Send + 'a>;

/// Drives one sample to completion
pub(crate) struct Sampler<'a> {
    pub(crate) id: &'a str,
    pub(crate) metric: &'a mut dyn Metric,
    pub(crate) validator: &'a dyn Validator,
    pub(crate) reporter: &'a dyn Reporter,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) max_samples: usize,
}

impl Sampler<'_> {
    /// Run until the validator accepts a window or `max_samples` is reached
    pub(crate) async fn sample(
        &mut self,
        execute: &mut Routine<'_>,
        mut prepare: Option<&mut Routine<'_>>,
    ) -> Result<SampleState, RunnerError> {
        let mut completed: Vec<MeasureValues> = Vec::new();

        for run_index in 0..self.max_samples {
            if let Some(prepare) = prepare.as_deref_mut() {
                prepare();
            }

            self.metric.begin_measure();
            execute();
            let values = self.metric.end_measure();

            let measured = MeasureValues {
                run_index,
                timestamp: self.clock.now(),
                values,
            };
            self.reporter.report_measure_values(&measured).await?;
            completed.push(measured);

            if let Some(valid) = self.validator.validate(&completed) {
                self.reporter.report_sample(&completed, &valid).await?;
                return Ok(SampleState { completed, valid });
            }
        }

        Err(RunnerError::SampleLimit {
            id: self.id.to_string(),
            limit: self.max_samples,
        })
    }
}
