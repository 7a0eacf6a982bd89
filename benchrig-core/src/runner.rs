//! Base Runner
//!
//! The environment-agnostic runner. Everything it needs from its environment
//! arrives through the [`BindingList`] in its [`RunnerConfig`]; the bindings
//! are resolved once in [`Runner::new`] and never change afterwards.
//!
//! ## Construction-time checks
//!
//! A runner that is configured to persist output (`json_output_dir` set) must
//! have `WRITE_FILE` bound. This is checked in [`Runner::new`], so a missing
//! binding is a configuration error rather than a failure after the benchmark
//! has already run.

use crate::capability::{BindingList, CapabilityRegistry};
use crate::error::RunnerError;
use crate::metric::{Metric, WALL_TIME_METRIC, WallClockMetric};
use crate::reporter::{ConsoleReporter, JsonFileReporter, MultiReporter};
use crate::sample::{SampleDescription, SampleState};
use crate::sampler::{Routine, Sampler};
use crate::validator::{DEFAULT_SAMPLE_SIZE, RegressionSlopeValidator, SizeValidator, Validator};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Default cap on runs per sample
pub const DEFAULT_MAX_SAMPLES: usize = 1_000;

/// Sample ids name report files, so they must stay inside the output directory
fn check_sample_id(id: &str) -> Result<(), RunnerError> {
    if id.is_empty() || id.contains("..") || id.chars().any(std::path::is_separator) {
        return Err(RunnerError::InvalidSampleId(id.to_string()));
    }
    Ok(())
}

/// Which validator ends a sample
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidatorKind {
    /// Accept the latest `sample_size` runs
    #[default]
    Size,
    /// Accept the latest `sample_size` runs once `metric` is not trending down
    RegressionSlope {
        /// Metric whose slope is checked
        metric: String,
    },
}

impl ValidatorKind {
    /// Regression-slope validation on wall-clock time
    pub fn regression_slope_on_wall_time() -> Self {
        ValidatorKind::RegressionSlope {
            metric: WALL_TIME_METRIC.to_string(),
        }
    }
}

/// Behaviour of a runner, independent of its environment
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Runs in the accepted window
    pub sample_size: usize,
    /// Give up after this many runs without an accepted window
    pub max_samples: usize,
    /// Window acceptance rule
    pub validator: ValidatorKind,
    /// Write each finished sample as JSON into this directory (needs `WRITE_FILE`)
    pub json_output_dir: Option<PathBuf>,
    /// Log runs and summaries through `tracing`
    pub console: bool,
    /// Description entries added to every sample
    pub description: BTreeMap<String, Value>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            max_samples: DEFAULT_MAX_SAMPLES,
            validator: ValidatorKind::default(),
            json_output_dir: None,
            console: true,
            description: BTreeMap::new(),
        }
    }
}

impl RunnerOptions {
    fn check(&self) -> Result<(), RunnerError> {
        if self.sample_size == 0 {
            return Err(RunnerError::InvalidOptions(
                "sample_size must be at least 1".to_string(),
            ));
        }
        if self.max_samples < self.sample_size {
            return Err(RunnerError::InvalidOptions(format!(
                "max_samples ({}) is smaller than sample_size ({})",
                self.max_samples, self.sample_size
            )));
        }
        Ok(())
    }

    fn build_validator(&self) -> Box<dyn Validator> {
        match &self.validator {
            ValidatorKind::Size => Box::new(SizeValidator::new(self.sample_size)),
            ValidatorKind::RegressionSlope { metric } => Box::new(RegressionSlopeValidator::new(
                self.sample_size,
                metric.clone(),
            )),
        }
    }
}

/// Everything a [`Runner`] is built from
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Capability bindings, applied after the defaults in order
    pub bindings: BindingList,
    /// Runner behaviour
    pub options: RunnerOptions,
}

impl RunnerConfig {
    /// Config with `bindings` and default options
    pub fn new(bindings: BindingList) -> Self {
        Self {
            bindings,
            options: RunnerOptions::default(),
        }
    }

    /// Replace the options
    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }
}

/// One benchmark to sample
pub struct SampleRequest<'a> {
    id: String,
    execute: Routine<'a>,
    prepare: Option<Routine<'a>>,
    description: BTreeMap<String, Value>,
    bindings: BindingList,
    metric: Option<Box<dyn Metric + 'a>>,
}

impl<'a> SampleRequest<'a> {
    /// Sample `execute` under the identifier `id`
    pub fn new<F, T>(id: impl Into<String>, mut execute: F) -> Self
    where
        F: FnMut() -> T + Send + 'a,
    {
        Self {
            id: id.into(),
            execute: Box::new(move || {
                std::hint::black_box(execute());
            }),
            prepare: None,
            description: BTreeMap::new(),
            bindings: BindingList::new(),
            metric: None,
        }
    }

    /// Untimed step run before every execution
    pub fn prepare<F, T>(mut self, mut prepare: F) -> Self
    where
        F: FnMut() -> T + Send + 'a,
    {
        self.prepare = Some(Box::new(move || {
            std::hint::black_box(prepare());
        }));
        self
    }

    /// Add a description entry for this sample
    pub fn describe(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.description.insert(key.into(), value.into());
        self
    }

    /// Bindings layered over the runner's for this sample only
    pub fn bindings(mut self, bindings: BindingList) -> Self {
        self.bindings = bindings;
        self
    }

    /// Replace the default wall-clock metric
    pub fn metric(mut self, metric: impl Metric + 'a) -> Self {
        self.metric = Some(Box::new(metric));
        self
    }

    /// Sample identifier
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Environment-agnostic benchmark runner
#[derive(Debug)]
pub struct Runner {
    registry: Arc<CapabilityRegistry>,
    options: RunnerOptions,
}

impl Runner {
    /// Resolve bindings and check that every capability the options need is bound
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let RunnerConfig { bindings, options } = config;
        options.check()?;

        let registry = CapabilityRegistry::resolve(&bindings);
        registry.clock()?;
        if options.json_output_dir.is_some() {
            registry.write_file()?;
        }

        tracing::debug!(
            capabilities = ?registry.bound(),
            sample_size = options.sample_size,
            "runner constructed"
        );

        Ok(Self {
            registry: Arc::new(registry),
            options,
        })
    }

    /// Resolved capabilities
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Runner options
    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Run `request` until its validator accepts a window.
    ///
    /// Reporter failures, including failed `WRITE_FILE` calls, end the sample
    /// and are returned unchanged.
    pub async fn sample(&self, request: SampleRequest<'_>) -> Result<SampleState, RunnerError> {
        let SampleRequest {
            id,
            mut execute,
            mut prepare,
            description: request_description,
            bindings,
            metric,
        } = request;
        check_sample_id(&id)?;

        let registry = if bindings.is_empty() {
            Arc::clone(&self.registry)
        } else {
            Arc::new(self.registry.with_overrides(&bindings))
        };
        let clock = registry.clock()?;

        let validator = self.options.build_validator();
        let mut metric: Box<dyn Metric + '_> = match metric {
            Some(metric) => metric,
            None => Box::new(WallClockMetric::new()),
        };
        let metrics = metric.describe();
        if let ValidatorKind::RegressionSlope { metric: slope_metric } = &self.options.validator {
            if !metrics.contains_key(slope_metric) {
                return Err(RunnerError::InvalidOptions(format!(
                    "slope metric `{slope_metric}` is not measured (measured: {})",
                    metrics.keys().cloned().collect::<Vec<_>>().join(", ")
                )));
            }
        }

        // Later sources win: runner defaults, validator settings, request entries
        let mut description = self.options.description.clone();
        description.extend(validator.describe());
        description.extend(request_description);
        let description = SampleDescription {
            id: id.clone(),
            description,
            metrics,
        };

        let mut reporter = MultiReporter::new();
        if self.options.console {
            reporter.push(ConsoleReporter::new(description.clone()));
        }
        if let Some(directory) = &self.options.json_output_dir {
            reporter.push(JsonFileReporter::new(
                description.clone(),
                directory.clone(),
                registry.write_file()?,
                Arc::clone(&clock),
            ));
        }

        let mut sampler = Sampler {
            id: &id,
            metric: metric.as_mut(),
            validator: validator.as_ref(),
            reporter: &reporter,
            clock,
            max_samples: self.options.max_samples,
        };
        let state = sampler.sample(&mut execute, prepare.as_mut()).await?;

        tracing::info!(
            sample = %id,
            runs = state.completed.len(),
            valid = state.valid.len(),
            "sample complete"
        );
        Ok(state)
    }
}
