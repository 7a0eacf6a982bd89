//! Host Runner Factory
//!
//! Builds a core [`Runner`] for an environment with a filesystem. The factory
//! adds exactly one binding, `WRITE_FILE` backed by [`HostFileWriter`], and
//! leaves every other part of construction and sampling to the core.
//!
//! ## Binding precedence
//!
//! The host binding is registered *before* the caller's bindings. Because the
//! registry resolves last-registration-wins, a caller-supplied `WRITE_FILE`
//! replaces the host one (useful for recording writes or redirecting them).

use crate::config::BenchrigConfig;
use crate::writer::HostFileWriter;
use anyhow::Context;
use benchrig_core::{
    Binding, BindingList, FileWriter, Runner, RunnerConfig, RunnerError, RunnerOptions,
};

/// `bindings` with the host `WRITE_FILE` registered in front of them
pub fn host_bindings(bindings: Option<BindingList>) -> BindingList {
    host_bindings_with(HostFileWriter::new(), bindings)
}

/// `bindings` with `writer` registered as the host `WRITE_FILE` in front of them
pub fn host_bindings_with(
    writer: impl FileWriter + 'static,
    bindings: Option<BindingList>,
) -> BindingList {
    let mut list = BindingList::new().with(Binding::write_file(writer));
    if let Some(caller) = bindings {
        list.extend(caller);
    }
    list
}

/// Runner configuration for the host environment
pub fn host_config(bindings: Option<BindingList>, options: RunnerOptions) -> RunnerConfig {
    RunnerConfig::new(host_bindings(bindings)).with_options(options)
}

/// Construct a runner with host capabilities.
///
/// ```ignore
/// let runner = host_runner(None, RunnerOptions::default())?;
/// let state = runner.sample(SampleRequest::new("sort", || data.sort())).await?;
/// ```
pub fn host_runner(
    bindings: Option<BindingList>,
    options: RunnerOptions,
) -> Result<Runner, RunnerError> {
    Runner::new(host_config(bindings, options))
}

/// Construct a runner from a loaded `benchrig.toml`.
///
/// The `[host]` section configures the host writer (e.g. its timeout); the
/// remaining sections become [`RunnerOptions`]. When JSON output is enabled
/// the output directory is created up front.
pub fn host_runner_from_config(
    config: &BenchrigConfig,
    bindings: Option<BindingList>,
) -> anyhow::Result<Runner> {
    let mut writer = HostFileWriter::new();
    if let Some(limit) = config.host.write_timeout()? {
        writer = writer.with_timeout(limit);
    }

    let options = config.to_runner_options();
    if let Some(directory) = &options.json_output_dir {
        std::fs::create_dir_all(directory)
            .with_context(|| format!("failed to create {}", directory.display()))?;
    }
    let runner = Runner::new(
        RunnerConfig::new(host_bindings_with(writer, bindings)).with_options(options),
    )?;
    Ok(runner)
}
