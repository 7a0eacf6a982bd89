//! Configuration loading from benchrig.toml
//!
//! benchrig configuration can be specified in a `benchrig.toml` file in the project root.
//! The configuration is discovered by walking up from the current directory.
//! Every field has a default, so an empty file (or no file) is valid.

use anyhow::Context;
use benchrig_core::{RunnerOptions, ValidatorKind, WALL_TIME_METRIC};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file looked up by [`BenchrigConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "benchrig.toml";

/// benchrig configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BenchrigConfig {
    /// Sampling configuration
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Host capability configuration
    #[serde(default)]
    pub host: HostConfig,
    /// Extra description entries recorded with every sample
    #[serde(default)]
    pub description: BTreeMap<String, String>,
}

/// Validator selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ValidatorChoice {
    /// Accept the latest `sample_size` runs
    #[default]
    Size,
    /// Accept the latest `sample_size` runs once `slope_metric` stops decreasing
    RegressionSlope,
}

/// Sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Runs in the accepted window
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Runs attempted before giving up
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    /// Validator: "size" or "regression-slope"
    #[serde(default)]
    pub validator: ValidatorChoice,
    /// Metric judged by the regression-slope validator
    #[serde(default = "default_slope_metric")]
    pub slope_metric: String,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            max_samples: default_max_samples(),
            validator: ValidatorChoice::default(),
            slope_metric: default_slope_metric(),
        }
    }
}

fn default_sample_size() -> usize {
    benchrig_core::DEFAULT_SAMPLE_SIZE
}
fn default_max_samples() -> usize {
    benchrig_core::DEFAULT_MAX_SAMPLES
}
fn default_slope_metric() -> String {
    WALL_TIME_METRIC.to_string()
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for JSON sample reports
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Write a JSON report for every sample
    #[serde(default)]
    pub json: bool,
    /// Log runs and summaries
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            json: false,
            console: default_console(),
        }
    }
}

fn default_output_dir() -> String {
    "target/benchrig".to_string()
}
fn default_console() -> bool {
    true
}

/// Host capability configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HostConfig {
    /// Upper bound for a single file write (e.g. "30s"); unbounded when unset
    #[serde(default)]
    pub write_timeout: Option<String>,
}

impl HostConfig {
    /// Parsed write timeout
    pub fn write_timeout(&self) -> anyhow::Result<Option<Duration>> {
        self.write_timeout
            .as_deref()
            .map(BenchrigConfig::parse_duration)
            .transpose()
    }
}

impl BenchrigConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Discover and load configuration by walking up from the current directory.
    ///
    /// `Ok(None)` means no file was found.
    pub fn discover() -> anyhow::Result<Option<Self>> {
        let dir = std::env::current_dir().context("failed to read current directory")?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for [`CONFIG_FILE_NAME`].
    ///
    /// The first file found is loaded; a file that fails to load is an error,
    /// not a reason to keep walking or fall back to defaults.
    pub fn discover_from(start: &Path) -> anyhow::Result<Option<Self>> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                let config = Self::load(&config_path)?;
                tracing::debug!(path = %config_path.display(), "loaded configuration");
                return Ok(Some(config));
            }
            if !dir.pop() {
                return Ok(None);
            }
        }
    }

    /// Runner options described by this configuration
    pub fn to_runner_options(&self) -> RunnerOptions {
        let validator = match self.sampling.validator {
            ValidatorChoice::Size => ValidatorKind::Size,
            ValidatorChoice::RegressionSlope => ValidatorKind::RegressionSlope {
                metric: self.sampling.slope_metric.clone(),
            },
        };

        RunnerOptions {
            sample_size: self.sampling.sample_size,
            max_samples: self.sampling.max_samples,
            validator,
            json_output_dir: self
                .output
                .json
                .then(|| PathBuf::from(&self.output.directory)),
            console: self.output.console,
            description: self
                .description
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(v.as_str())))
                .collect(),
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# benchrig Configuration

[sampling]
# Runs in the accepted window
sample_size = 10
# Runs attempted before a sample is abandoned
max_samples = 1000
# Validator: "size" or "regression-slope"
validator = "size"
# Metric judged by the regression-slope validator
slope_metric = "wallTimeMs"

[output]
# Directory for JSON sample reports
directory = "target/benchrig"
# Write a JSON report for every sample (requires WRITE_FILE)
json = false
# Log runs and summaries
console = true

[host]
# Upper bound for a single file write (uncomment to enable)
# write_timeout = "30s"

[description]
# Free-form entries recorded with every sample (uncomment to enable)
# machine = "ci-runner-1"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic() || *c == 'µ')
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration number: {}", num_part));
        }

        let nanos_per_unit: f64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1.0,
            "us" | "µs" => 1_000.0,
            "ms" => 1_000_000.0,
            "s" => 1_000_000_000.0,
            "m" | "min" => 60_000_000_000.0,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_nanos((value * nanos_per_unit) as u64))
    }
}
