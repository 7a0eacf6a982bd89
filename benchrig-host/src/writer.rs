//! Host `WRITE_FILE` Implementation
//!
//! Wraps a [`WritePrimitive`] so that it satisfies the `WRITE_FILE` contract:
//! every primitive error becomes a `WriteFailure` returned from the future,
//! and success is only reported after the primitive completed without error.

use crate::fs::{TokioFs, WritePrimitive};
use async_trait::async_trait;
use benchrig_core::{FileWriter, WriteFailure};
use std::path::Path;
use std::time::Duration;

/// `WRITE_FILE` backed by the host filesystem
#[derive(Debug, Clone, Default)]
pub struct HostFileWriter<P = TokioFs> {
    primitive: P,
    timeout: Option<Duration>,
}

impl HostFileWriter {
    /// Writer using `tokio::fs`, without a timeout
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: WritePrimitive> HostFileWriter<P> {
    /// Writer over a custom primitive
    pub fn with_primitive(primitive: P) -> Self {
        Self {
            primitive,
            timeout: None,
        }
    }

    /// Fail writes that take longer than `limit`
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Configured timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl<P: WritePrimitive> FileWriter for HostFileWriter<P> {
    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<(), WriteFailure> {
        let write = self.primitive.write(path, content);
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, write).await {
                Ok(outcome) => outcome,
                Err(_) => return Err(WriteFailure::timed_out(path, limit)),
            },
            None => write.await,
        };

        outcome.map_err(|err| WriteFailure::io(path, err))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "file written");
        Ok(())
    }
}
