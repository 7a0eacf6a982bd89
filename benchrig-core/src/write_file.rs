//! The `WRITE_FILE` Capability
//!
//! Persisting results is the one thing the runner cannot do on its own: a
//! restricted environment has no filesystem, a host environment has one. The
//! runner therefore only sees a [`FileWriter`] and whatever implementation was
//! bound for [`CapabilityId::WriteFile`](crate::CapabilityId::WriteFile).
//!
//! Contract:
//! - `content` is the complete payload; the target is created or overwritten.
//! - `Ok(())` means the write has been committed before the future resolved.
//! - Any failure is returned as a [`WriteFailure`] carrying the underlying
//!   detail. Implementations never panic and never report success after an
//!   error.
//! - Calls are not serialized. Callers that need ordering await each write.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

/// Asynchronous "write a named file with the given content" capability.
#[async_trait]
pub trait FileWriter: Send + Sync {
    /// Create or overwrite `path` with exactly `content`.
    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<(), WriteFailure>;
}

/// A write that did not complete.
#[derive(Debug, Error)]
#[error("failed to write `{}`", .path.display())]
pub struct WriteFailure {
    path: PathBuf,
    #[source]
    kind: WriteFailureKind,
}

/// Underlying cause of a [`WriteFailure`]
#[derive(Debug, Error)]
pub enum WriteFailureKind {
    /// The environment's write primitive reported an error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The write did not complete within the configured limit
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

impl WriteFailure {
    /// Failure with an explicit cause
    pub fn new(path: impl Into<PathBuf>, kind: WriteFailureKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Failure reported by an I/O primitive
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::new(path, WriteFailureKind::Io(error))
    }

    /// Failure caused by a write exceeding its time limit
    pub fn timed_out(path: impl Into<PathBuf>, limit: Duration) -> Self {
        Self::new(path, WriteFailureKind::TimedOut(limit))
    }

    /// Target path of the failed write
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cause of the failure
    pub fn kind(&self) -> &WriteFailureKind {
        &self.kind
    }

    /// The I/O error, when the primitive itself failed
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match &self.kind {
            WriteFailureKind::Io(err) => Some(err),
            WriteFailureKind::TimedOut(_) => None,
        }
    }
}

/// [`FileWriter`] backed by an async closure.
///
/// Created with [`write_file_fn`].
pub struct FnFileWriter<F> {
    write: F,
}

impl<F> std::fmt::Debug for FnFileWriter<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFileWriter").finish_non_exhaustive()
    }
}

/// Adapt an async closure into a [`FileWriter`].
///
/// The closure receives owned copies of the path and content so the returned
/// future can outlive the call site.
///
/// ```ignore
/// let writer = write_file_fn(|path, content| async move {
///     println!("{} <- {} bytes", path.display(), content.len());
///     Ok(())
/// });
/// ```
pub fn write_file_fn<F, Fut>(write: F) -> FnFileWriter<F>
where
    F: Fn(PathBuf, Vec<u8>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), WriteFailure>> + Send + 'static,
{
    FnFileWriter { write }
}

#[async_trait]
impl<F, Fut> FileWriter for FnFileWriter<F>
where
    F: Fn(PathBuf, Vec<u8>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), WriteFailure>> + Send + 'static,
{
    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<(), WriteFailure> {
        (self.write)(path.to_path_buf(), content.to_vec()).await
    }
}

/// In-memory [`FileWriter`] for environments without a filesystem.
///
/// Files are kept in a map keyed by path; later writes overwrite earlier ones.
#[derive(Debug, Default)]
pub struct MemoryFileWriter {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileWriter {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Content last written to `path`
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files().get(path.as_ref()).cloned()
    }

    /// Paths written so far, in sorted order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files().keys().cloned().collect()
    }

    /// Number of distinct paths written
    pub fn len(&self) -> usize {
        self.files().len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every insert is a single map operation, so a poisoned map is still whole
    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl FileWriter for MemoryFileWriter {
    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<(), WriteFailure> {
        self.files().insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }
}
