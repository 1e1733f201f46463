//! Real-Debrid resolver implementation.
//!
//! Uses the `unrestrict/link` endpoint, which exchanges a hoster or cached
//! link for a direct download URL.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::config::DebridConfig;
use super::error::ResolveError;
use super::traits::LinkResolver;
use super::types::{check_raw_link, ResolvedLink};

/// Real-Debrid REST API client.
pub struct RealDebridResolver {
    client: Client,
    base_url: String,
    api_token: String,
}

impl RealDebridResolver {
    /// Create a new resolver from the debrid configuration.
    pub fn new(config: &DebridConfig) -> Result<Self, ResolveError> {
        if config.api_token.trim().is_empty() {
            return Err(ResolveError::ProviderAuth(
                "Real-Debrid API token is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ResolveError::ProviderUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.trim().to_string(),
        })
    }

    fn unrestrict_url(&self) -> String {
        format!("{}/unrestrict/link", self.base_url)
    }
}

#[async_trait]
impl LinkResolver for RealDebridResolver {
    fn name(&self) -> &str {
        "real-debrid"
    }

    async fn resolve(&self, raw_link: &str) -> Result<ResolvedLink, ResolveError> {
        let link = check_raw_link(raw_link)?;

        debug!(raw_link = link, "Unrestricting link");

        let response = self
            .client
            .post(self.unrestrict_url())
            .bearer_auth(&self.api_token)
            .form(&[("link", link)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResolveError::ProviderUnavailable("request timed out".to_string())
                } else if e.is_connect() {
                    ResolveError::ProviderUnavailable(format!("connection failed: {}", e))
                } else {
                    ResolveError::ProviderUnavailable(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::ProviderUnavailable(format!("failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        parse_unrestrict_body(&body)
    }
}

/// Error body returned by the Real-Debrid API.
#[derive(Debug, Deserialize)]
struct RdErrorBody {
    error: Option<String>,
    error_code: Option<i64>,
}

/// Subset of the `unrestrict/link` success body we rely on.
#[derive(Debug, Deserialize)]
struct UnrestrictResponse {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    download: Option<String>,
}

/// Maps a non-2xx response onto a resolve failure kind.
///
/// Real-Debrid error codes take precedence over the HTTP status since the
/// same status is reused for unrelated conditions.
fn classify_failure(status: StatusCode, body: &str) -> ResolveError {
    let parsed: Option<RdErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|b| b.error_code);
    let detail = parsed
        .and_then(|b| b.error)
        .unwrap_or_else(|| body.chars().take(200).collect());
    let message = format!("HTTP {}: {}", status.as_u16(), detail);

    match code {
        Some(1 | 2 | 16 | 35) => ResolveError::InvalidLink(message),
        Some(5 | 17 | 19 | 25 | 34 | 36) => ResolveError::ProviderUnavailable(message),
        Some(8 | 9 | 14 | 15 | 20 | 22 | 23) => ResolveError::ProviderAuth(message),
        Some(7 | 24) => ResolveError::NotCached(message),
        _ => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ResolveError::ProviderAuth(message),
            StatusCode::NOT_FOUND => ResolveError::NotCached(message),
            StatusCode::TOO_MANY_REQUESTS => ResolveError::ProviderUnavailable(message),
            s if s.is_server_error() => ResolveError::ProviderUnavailable(message),
            s if s.is_client_error() => ResolveError::InvalidLink(message),
            _ => ResolveError::ProviderUnavailable(message),
        },
    }
}

/// Parses a 2xx body. Some hosters answer with an array; the first element wins.
fn parse_unrestrict_body(body: &str) -> Result<ResolvedLink, ResolveError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        ResolveError::ProviderUnavailable(format!("malformed provider response: {}", e))
    })?;

    let value = match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        other => other,
    };

    let parsed: UnrestrictResponse = serde_json::from_value(value).map_err(|e| {
        ResolveError::ProviderUnavailable(format!("malformed provider response: {}", e))
    })?;

    let url = parsed
        .download
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ResolveError::NotCached("provider returned no stream URL".to_string()))?;

    Ok(ResolvedLink {
        url,
        filename: parsed.filename.filter(|f| !f.is_empty()),
        expires_at: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DebridConfig {
        DebridConfig::default().with_token("test-token")
    }

    #[test]
    fn test_new_requires_token() {
        let result = RealDebridResolver::new(&DebridConfig::default());
        assert!(matches!(result, Err(ResolveError::ProviderAuth(_))));
    }

    #[test]
    fn test_unrestrict_url_strips_trailing_slash() {
        let resolver =
            RealDebridResolver::new(&config().with_base_url("http://localhost:1234/rest/1.0/"))
                .unwrap();
        assert_eq!(
            resolver.unrestrict_url(),
            "http://localhost:1234/rest/1.0/unrestrict/link"
        );
    }

    #[tokio::test]
    async fn test_invalid_link_fails_before_network() {
        // Port 9 (discard) is never contacted: validation fails first.
        let resolver =
            RealDebridResolver::new(&config().with_base_url("http://127.0.0.1:9")).unwrap();
        let result = resolver.resolve("not-a-link").await;
        assert!(matches!(result, Err(ResolveError::InvalidLink(_))));
    }

    #[test]
    fn test_parse_success_body() {
        let body = r#"{
            "id": "ABC",
            "filename": "Arrival.2016.1080p.mkv",
            "link": "https://hoster.example/abc",
            "download": "https://cdn.real-debrid.com/d/ABC/Arrival.2016.1080p.mkv",
            "streamable": 1
        }"#;
        let link = parse_unrestrict_body(body).unwrap();
        assert_eq!(
            link.url,
            "https://cdn.real-debrid.com/d/ABC/Arrival.2016.1080p.mkv"
        );
        assert_eq!(link.filename.as_deref(), Some("Arrival.2016.1080p.mkv"));
        assert!(link.expires_at.is_none());
    }

    #[test]
    fn test_parse_array_body_takes_first() {
        let body = r#"[{"download": "https://cdn/1"}, {"download": "https://cdn/2"}]"#;
        assert_eq!(parse_unrestrict_body(body).unwrap().url, "https://cdn/1");
    }

    #[test]
    fn test_parse_body_without_download_is_not_cached() {
        let body = r#"{"filename": "x.mkv"}"#;
        assert!(matches!(
            parse_unrestrict_body(body),
            Err(ResolveError::NotCached(_))
        ));
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            parse_unrestrict_body("<html>oops</html>"),
            Err(ResolveError::ProviderUnavailable(_))
        ));
    }

    #[test]
    fn test_classify_by_error_code() {
        let bad_token = r#"{"error": "bad_token", "error_code": 8}"#;
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, bad_token),
            ResolveError::ProviderAuth(_)
        ));

        let unavailable_file = r#"{"error": "unavailable_file", "error_code": 24}"#;
        assert!(matches!(
            classify_failure(StatusCode::SERVICE_UNAVAILABLE, unavailable_file),
            ResolveError::NotCached(_)
        ));

        let unsupported = r#"{"error": "hoster_unsupported", "error_code": 16}"#;
        assert!(matches!(
            classify_failure(StatusCode::SERVICE_UNAVAILABLE, unsupported),
            ResolveError::InvalidLink(_)
        ));

        let maintenance = r#"{"error": "hoster_in_maintenance", "error_code": 17}"#;
        assert!(matches!(
            classify_failure(StatusCode::SERVICE_UNAVAILABLE, maintenance),
            ResolveError::ProviderUnavailable(_)
        ));
    }

    #[test]
    fn test_classify_by_status_without_code() {
        assert!(matches!(
            classify_failure(StatusCode::BAD_GATEWAY, "upstream died"),
            ResolveError::ProviderUnavailable(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, ""),
            ResolveError::ProviderAuth(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::NOT_FOUND, ""),
            ResolveError::NotCached(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, "{}"),
            ResolveError::InvalidLink(_)
        ));
    }

    #[test]
    fn test_classify_message_carries_status_and_error() {
        let err = classify_failure(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error": "unavailable_file", "error_code": 24}"#,
        );
        assert_eq!(
            err.to_string(),
            "Content not cached: HTTP 503: unavailable_file"
        );
    }
}
