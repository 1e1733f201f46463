//! Mock strm writer for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::strm::{FsStrmWriter, RemoveOutcome, StrmWriter, WriteError, WriteReceipt};

/// A recorded write for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    /// Library-relative path.
    pub path: PathBuf,
    /// URL that was to be written.
    pub url: String,
    /// Whether the write succeeded.
    pub success: bool,
}

/// Mock implementation of the StrmWriter trait.
///
/// Writes go to a real [`FsStrmWriter`] so file contents can be asserted;
/// failures can be injected per call or per path.
///
/// # Example
///
/// ```rust,ignore
/// use rdfin_core::testing::MockStrmWriter;
///
/// let writer = MockStrmWriter::new(temp.path());
/// writer.fail_path("movies/Arrival/Arrival.strm").await;
///
/// let result = writer.write(Path::new("movies/Arrival/Arrival.strm"), url).await;
/// assert!(result.is_err());
/// ```
pub struct MockStrmWriter {
    inner: FsStrmWriter,
    /// Recorded writes.
    writes: Arc<RwLock<Vec<RecordedWrite>>>,
    /// Recorded removals.
    removals: Arc<RwLock<Vec<PathBuf>>>,
    /// If set, the next write will fail with this error.
    next_error: Arc<RwLock<Option<WriteError>>>,
    /// Paths whose writes and removals always fail.
    failing_paths: Arc<RwLock<HashSet<PathBuf>>>,
}

impl MockStrmWriter {
    /// Create a mock writer backed by a real media root.
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            inner: FsStrmWriter::new(media_root),
            writes: Arc::new(RwLock::new(Vec::new())),
            removals: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_paths: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    pub fn media_root(&self) -> &Path {
        self.inner.media_root()
    }

    /// Get all recorded writes.
    pub async fn recorded_writes(&self) -> Vec<RecordedWrite> {
        self.writes.read().await.clone()
    }

    /// Get all recorded removals.
    pub async fn recorded_removals(&self) -> Vec<PathBuf> {
        self.removals.read().await.clone()
    }

    /// Configure the next write to fail with the given error.
    pub async fn set_next_error(&self, error: WriteError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every write and removal of `path` fail with `PermissionDenied`.
    pub async fn fail_path(&self, path: impl Into<PathBuf>) {
        self.failing_paths.write().await.insert(path.into());
    }

    /// Stop failing any path.
    pub async fn clear_failures(&self) {
        self.failing_paths.write().await.clear();
        *self.next_error.write().await = None;
    }

    async fn injected_failure(&self, rel_path: &Path) -> Option<WriteError> {
        if self.failing_paths.read().await.contains(rel_path) {
            return Some(WriteError::PermissionDenied {
                path: self.inner.media_root().join(rel_path),
            });
        }
        None
    }
}

#[async_trait]
impl StrmWriter for MockStrmWriter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn write(&self, rel_path: &Path, url: &str) -> Result<WriteReceipt, WriteError> {
        let injected = match self.next_error.write().await.take() {
            Some(error) => Some(error),
            None => self.injected_failure(rel_path).await,
        };

        let result = match injected {
            Some(error) => Err(error),
            None => self.inner.write(rel_path, url).await,
        };

        self.writes.write().await.push(RecordedWrite {
            path: rel_path.to_path_buf(),
            url: url.to_string(),
            success: result.is_ok(),
        });
        result
    }

    async fn remove(&self, rel_path: &Path) -> Result<RemoveOutcome, WriteError> {
        self.removals.write().await.push(rel_path.to_path_buf());
        if let Some(error) = self.injected_failure(rel_path).await {
            return Err(error);
        }
        self.inner.remove(rel_path).await
    }
}
