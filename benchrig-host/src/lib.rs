#![warn(missing_docs)]
//! benchrig Host - Host Environment Adapter
//!
//! Supplies the capabilities a full host environment has and a restricted one
//! does not:
//! - `WRITE_FILE` backed by `tokio::fs` (`HostFileWriter`)
//! - a factory that pre-fills the binding and builds a core `Runner`
//! - `benchrig.toml` configuration and logging setup
//!
//! Everything else is the unchanged core runner from `benchrig-core`.

mod config;
mod fs;
mod logging;
mod runner;
mod writer;

pub use config::{
    BenchrigConfig, CONFIG_FILE_NAME, HostConfig, OutputConfig, SamplingConfig, ValidatorChoice,
};
pub use fs::{TokioFs, WritePrimitive};
pub use logging::{default_filter, init_logging};
pub use runner::{
    host_bindings, host_bindings_with, host_config, host_runner, host_runner_from_config,
};
pub use writer::HostFileWriter;
