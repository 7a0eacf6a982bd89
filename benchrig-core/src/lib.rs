#![warn(missing_docs)]
//! benchrig Core - Environment-Agnostic Runner
//!
//! This crate provides the benchmark runner that does not know where it runs:
//! - `CapabilityRegistry` resolving injected environment capabilities
//! - `FileWriter` contract for the `WRITE_FILE` capability
//! - `Runner` with a sampling loop, validators, metrics and reporters
//!
//! Environment adapters (see `benchrig-host`) supply the capabilities this
//! crate cannot provide itself, most importantly `WRITE_FILE`.

mod capability;
mod clock;
mod error;
mod metric;
mod reporter;
mod runner;
mod sample;
mod sampler;
pub mod statistic;
mod validator;
mod write_file;

pub use capability::{
    Binding, BindingList, CapabilityId, CapabilityImpl, CapabilityRegistry, UnboundCapability,
    default_bindings,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::RunnerError;
pub use metric::{Metric, WALL_TIME_METRIC, WallClockMetric};
pub use reporter::{ConsoleReporter, JsonFileReporter, MultiReporter, Reporter};
pub use runner::{
    DEFAULT_MAX_SAMPLES, Runner, RunnerConfig, RunnerOptions, SampleRequest, ValidatorKind,
};
pub use sample::{MeasureValues, SampleDescription, SampleState};
pub use sampler::Routine;
pub use validator::{DEFAULT_SAMPLE_SIZE, RegressionSlopeValidator, SizeValidator, Validator};
pub use write_file::{
    FileWriter, FnFileWriter, MemoryFileWriter, WriteFailure, WriteFailureKind, write_file_fn,
};

/// Re-exported so implementors of [`FileWriter`] and [`Reporter`] use the same macro version
pub use async_trait::async_trait;
