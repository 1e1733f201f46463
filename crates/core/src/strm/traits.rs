//! Trait definitions for the strm module.

use async_trait::async_trait;
use std::path::Path;

use super::error::WriteError;
use super::types::{RemoveOutcome, WriteReceipt};

/// Persists stream URLs as `.strm` files inside the media library.
///
/// Paths are library-relative, as produced by [`crate::planner::plan`].
#[async_trait]
pub trait StrmWriter: Send + Sync {
    /// Returns the name of this writer implementation.
    fn name(&self) -> &str;

    /// Write `url` to `rel_path`, replacing any previous content atomically.
    ///
    /// On failure the previous file, if any, is left untouched.
    async fn write(&self, rel_path: &Path, url: &str) -> Result<WriteReceipt, WriteError>;

    /// Remove the file at `rel_path`. A missing file is not an error.
    async fn remove(&self, rel_path: &Path) -> Result<RemoveOutcome, WriteError>;
}
