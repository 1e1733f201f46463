//! Error types for the resolver module.

use thiserror::Error;

/// Errors that can occur while resolving a debrid link.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The link is malformed or the provider does not support it.
    #[error("Invalid link: {0}")]
    InvalidLink(String),

    /// The provider could not be reached, timed out, or failed server-side.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider reports the content is not cached.
    #[error("Content not cached: {0}")]
    NotCached(String),

    /// The API token is missing, invalid or expired.
    #[error("Provider authentication failed: {0}")]
    ProviderAuth(String),
}

impl ResolveError {
    /// Whether this error is worth retrying automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_))
    }

    /// Whether every subsequent call in the same batch would fail the same way.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Self::ProviderAuth(_))
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidLink(_) => "invalid_link",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::NotCached(_) => "not_cached",
            Self::ProviderAuth(_) => "provider_auth",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(ResolveError::ProviderUnavailable("503".into()).is_retryable());
        assert!(!ResolveError::InvalidLink("x".into()).is_retryable());
        assert!(!ResolveError::NotCached("x".into()).is_retryable());
        assert!(!ResolveError::ProviderAuth("x".into()).is_retryable());
    }

    #[test]
    fn test_only_auth_is_batch_fatal() {
        assert!(ResolveError::ProviderAuth("bad_token".into()).is_batch_fatal());
        assert!(!ResolveError::ProviderUnavailable("x".into()).is_batch_fatal());
    }

    #[test]
    fn test_display_includes_reason() {
        let err = ResolveError::NotCached("file_unavailable".into());
        assert_eq!(err.to_string(), "Content not cached: file_unavailable");
        assert_eq!(err.kind(), "not_cached");
    }
}
