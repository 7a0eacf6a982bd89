#![warn(missing_docs)]
//! # benchrig
//!
//! Benchmark runner whose environment capabilities are injected at construction.
//!
//! The same runner core works in a restricted environment with no filesystem
//! and in a full host environment:
//! - **Capability Bindings**: `WRITE_FILE` and `NOW` are supplied as bindings,
//!   resolved once, and never change for the lifetime of a runner
//! - **Host Adapter**: `host_runner` pre-fills a `tokio::fs` backed `WRITE_FILE`
//! - **Fail Early**: a runner configured to persist output without `WRITE_FILE`
//!   fails at construction, not after the benchmark ran
//! - **Validators**: fixed-size windows or regression-slope warm-up detection
//! - **Reporters**: `tracing` console output and JSON files through `WRITE_FILE`
//!
//! ## Quick Start
//!
//! ```ignore
//! use benchrig::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runner = host_runner(None, RunnerOptions::default())?;
//!     let state = runner
//!         .sample(SampleRequest::new("sum", || (0..1_000u64).sum::<u64>()))
//!         .await?;
//!     println!("{} runs", state.completed.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Restricted Environments
//!
//! ```ignore
//! let store = Arc::new(MemoryFileWriter::new());
//! let runner = Runner::new(
//!     RunnerConfig::new(BindingList::new().with(Binding::write_file_arc(store.clone())))
//!         .with_options(options),
//! )?;
//! ```

// Re-export core types
pub use benchrig_core::{
    Binding, BindingList, CapabilityId, CapabilityImpl, CapabilityRegistry, Clock,
    ConsoleReporter, DEFAULT_MAX_SAMPLES, DEFAULT_SAMPLE_SIZE, FileWriter, FixedClock,
    FnFileWriter, JsonFileReporter, MeasureValues, MemoryFileWriter, Metric, MultiReporter,
    RegressionSlopeValidator, Reporter, Routine, Runner, RunnerConfig, RunnerError,
    RunnerOptions, SampleDescription, SampleRequest, SampleState, SizeValidator, SystemClock,
    UnboundCapability, Validator, ValidatorKind, WALL_TIME_METRIC, WallClockMetric,
    WriteFailure, WriteFailureKind, async_trait, default_bindings, statistic, write_file_fn,
};

// Re-export host adapter
pub use benchrig_host::{
    BenchrigConfig, CONFIG_FILE_NAME, HostConfig, HostFileWriter, OutputConfig, SamplingConfig,
    TokioFs, ValidatorChoice, WritePrimitive, host_bindings, host_bindings_with, host_config,
    host_runner, host_runner_from_config, init_logging,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Binding, BindingList, MemoryFileWriter, Runner, RunnerConfig, RunnerError, RunnerOptions,
        SampleRequest, SampleState, ValidatorKind, host_runner, write_file_fn,
    };
}

/// Build a host runner from the discovered `benchrig.toml` (or defaults).
///
/// A `benchrig.toml` that exists but does not parse is an error.
///
/// Call this from a benchmark binary's `main()`:
/// ```ignore
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     benchrig::init_logging(false);
///     let runner = benchrig::runner(None)?;
///     runner.sample(SampleRequest::new("noop", || ())).await?;
///     Ok(())
/// }
/// ```
pub fn runner(bindings: Option<BindingList>) -> anyhow::Result<Runner> {
    let config = BenchrigConfig::discover()?.unwrap_or_default();
    host_runner_from_config(&config, bindings)
}
