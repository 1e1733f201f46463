//! Types for the resolver module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ResolveError;

/// A direct stream URL issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLink {
    /// Direct, playable URL.
    pub url: String,
    /// Filename reported by the provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// When the URL stops working. `None` means unknown or long-lived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ResolvedLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            filename: None,
            expires_at: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

/// Validates a raw link before it is sent anywhere.
///
/// Returns the trimmed link. The link must be an `http(s)://` URL with a host
/// and no embedded whitespace.
pub fn check_raw_link(raw_link: &str) -> Result<&str, ResolveError> {
    let link = raw_link.trim();
    if link.is_empty() {
        return Err(ResolveError::InvalidLink("link is empty".to_string()));
    }

    let lower = link.to_ascii_lowercase();
    let rest = if lower.starts_with("https://") {
        &link[8..]
    } else if lower.starts_with("http://") {
        &link[7..]
    } else {
        return Err(ResolveError::InvalidLink(format!(
            "not an http(s) URL: {}",
            link
        )));
    };

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() {
        return Err(ResolveError::InvalidLink(format!("missing host: {}", link)));
    }
    if link.chars().any(char::is_whitespace) {
        return Err(ResolveError::InvalidLink(format!(
            "link contains whitespace: {}",
            link
        )));
    }

    Ok(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_raw_link_accepts_urls() {
        assert_eq!(
            check_raw_link("  https://real-debrid.com/d/ABC123  ").unwrap(),
            "https://real-debrid.com/d/ABC123"
        );
        assert!(check_raw_link("http://1fichier.com/?abc").is_ok());
        assert!(check_raw_link("HTTPS://example.com/file").is_ok());
    }

    #[test]
    fn test_check_raw_link_rejects_garbage() {
        assert!(matches!(
            check_raw_link(""),
            Err(ResolveError::InvalidLink(_))
        ));
        assert!(matches!(
            check_raw_link("not a link"),
            Err(ResolveError::InvalidLink(_))
        ));
        assert!(matches!(
            check_raw_link("ftp://example.com/file"),
            Err(ResolveError::InvalidLink(_))
        ));
        assert!(matches!(
            check_raw_link("https:///path-only"),
            Err(ResolveError::InvalidLink(_))
        ));
        assert!(matches!(
            check_raw_link("https://example.com/a b"),
            Err(ResolveError::InvalidLink(_))
        ));
    }

    #[test]
    fn test_resolved_link_builder() {
        let link = ResolvedLink::new("https://cdn.example/x.mkv").with_filename("x.mkv");
        assert_eq!(link.filename.as_deref(), Some("x.mkv"));
        assert!(link.expires_at.is_none());
    }
}
