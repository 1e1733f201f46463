//! Resolve, plan and write for a single link.
//!
//! Shared by ingestion and ledger refresh so both take the same path from a
//! raw link to a `.strm` file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::media::MediaTarget;
use crate::planner;
use crate::resolver::{resolve_with_retry, LinkResolver, ResolveError, ResolvedLink, RetryConfig};
use crate::strm::{StrmWriter, WriteError};

/// A link that made it onto disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub target: MediaTarget,
    pub resolved: ResolvedLink,
    /// Library-relative path of the written `.strm` file.
    pub strm_path: PathBuf,
}

/// Why a single link could not be materialized.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl MaterializeError {
    /// Whether the rest of a batch should be abandoned.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Self::Resolve(e) if e.is_batch_fatal())
    }
}

/// Resolver, planner and writer wired together.
pub struct Materializer {
    resolver: Arc<dyn LinkResolver>,
    writer: Arc<dyn StrmWriter>,
    retry: RetryConfig,
}

impl Materializer {
    pub fn new(
        resolver: Arc<dyn LinkResolver>,
        writer: Arc<dyn StrmWriter>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            resolver,
            writer,
            retry,
        }
    }

    pub fn writer(&self) -> &Arc<dyn StrmWriter> {
        &self.writer
    }

    /// Resolve `raw_link` and write the result to the planned path for `target`.
    ///
    /// Nothing is written unless resolution succeeds.
    pub async fn materialize(
        &self,
        target: &MediaTarget,
        raw_link: &str,
    ) -> Result<Materialized, MaterializeError> {
        self.materialize_at(target, raw_link, &planner::plan(target))
            .await
    }

    /// Resolve `raw_link` and write the result to an existing `strm_path`.
    pub async fn materialize_at(
        &self,
        target: &MediaTarget,
        raw_link: &str,
        strm_path: &Path,
    ) -> Result<Materialized, MaterializeError> {
        let resolved = resolve_with_retry(self.resolver.as_ref(), raw_link, &self.retry).await?;
        self.write(target.clone(), resolved, strm_path.to_path_buf())
            .await
    }

    /// Resolve a movie link that came without a title. The movie is named
    /// after the provider's filename, or the stream URL or raw link when the
    /// provider reports none.
    pub async fn materialize_movie(&self, raw_link: &str) -> Result<Materialized, MaterializeError> {
        let resolved = resolve_with_retry(self.resolver.as_ref(), raw_link, &self.retry).await?;
        let target =
            planner::movie_named_after(resolved.filename.as_deref(), &[&resolved.url, raw_link]);
        let strm_path = planner::plan(&target);
        self.write(target, resolved, strm_path).await
    }

    async fn write(
        &self,
        target: MediaTarget,
        resolved: ResolvedLink,
        strm_path: PathBuf,
    ) -> Result<Materialized, MaterializeError> {
        self.writer.write(&strm_path, &resolved.url).await?;

        debug!(
            media = %target,
            path = %strm_path.display(),
            "Materialized link"
        );

        Ok(Materialized {
            target,
            resolved,
            strm_path,
        })
    }
}
