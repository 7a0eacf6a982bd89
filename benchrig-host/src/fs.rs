//! Host Write Primitive
//!
//! The raw asynchronous "write a file" operation of the host. It reports
//! errors as plain `io::Error`s; [`HostFileWriter`](crate::HostFileWriter)
//! turns them into `WriteFailure`s.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Asynchronous file-write primitive of an environment
#[async_trait]
pub trait WritePrimitive: Send + Sync {
    /// Create or truncate `path` and write `content` to it
    async fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;
}

/// `tokio::fs` backed primitive.
///
/// Data is synced to disk before the write completes. A failure after the
/// file was created can leave it truncated or partially written; the error is
/// still reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl WritePrimitive for TokioFs {
    async fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        Ok(())
    }
}
