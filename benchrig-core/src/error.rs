//! Runner Errors

use crate::capability::UnboundCapability;
use crate::write_file::WriteFailure;
use thiserror::Error;

/// Errors surfaced by [`Runner`](crate::Runner) construction and sampling.
///
/// The runner never recovers from these locally; they are handed to the
/// caller unchanged.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// A required capability has no binding
    #[error(transparent)]
    Unbound(#[from] UnboundCapability),

    /// Persisting output through `WRITE_FILE` failed
    #[error(transparent)]
    Write(#[from] WriteFailure),

    /// A report could not be serialized
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The validator never accepted a window
    #[error("sample `{id}` did not become valid within {limit} runs")]
    SampleLimit {
        /// Sample identifier
        id: String,
        /// Maximum number of runs attempted
        limit: usize,
    },

    /// The sample id cannot be used as a report file name
    #[error("invalid sample id `{0}`: must be non-empty without path separators or `..`")]
    InvalidSampleId(String),

    /// Options are inconsistent
    #[error("invalid runner options: {0}")]
    InvalidOptions(String),
}
