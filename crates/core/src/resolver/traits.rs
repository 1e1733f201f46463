//! Trait definitions for the resolver module.

use async_trait::async_trait;

use super::error::ResolveError;
use super::types::ResolvedLink;

/// A provider that exchanges raw debrid links for direct stream URLs.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    /// Returns the name of this resolver implementation.
    fn name(&self) -> &str;

    /// Resolves one raw link. Makes at most one provider call; retrying is
    /// left to the caller.
    async fn resolve(&self, raw_link: &str) -> Result<ResolvedLink, ResolveError>;
}
