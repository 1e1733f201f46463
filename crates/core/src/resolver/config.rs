//! Configuration for the resolver module.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Debrid provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebridConfig {
    /// Real-Debrid API token. Usually supplied through `REALDEBRID_TOKEN`.
    #[serde(default)]
    pub api_token: String,

    /// REST API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Retry policy for transient provider failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Retry configuration for `ProviderUnavailable` failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Exponential backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_base_url() -> String {
    "https://api.real-debrid.com/rest/1.0".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("rdfin/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    5000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for DebridConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            retry: RetryConfig::default(),
        }
    }
}

impl DebridConfig {
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = token.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay(),
            max_delay_ms: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.max(1.0).powi(exponent);
        Duration::from_millis(delay.min(self.max_delay_ms as f64) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DebridConfig::default();
        assert_eq!(config.base_url, "https://api.real-debrid.com/rest/1.0");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("rdfin/"));
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            api_token = "abc"
        "#;
        let config: DebridConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api_token, "abc");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retry.initial_delay_ms, 500);
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let retry = RetryConfig {
            max_attempts: 5,
            initial_delay_ms: 100,
            max_delay_ms: 350,
            backoff_multiplier: 2.0,
        };
        assert_eq!(retry.delay_after(1), Duration::from_millis(100));
        assert_eq!(retry.delay_after(2), Duration::from_millis(200));
        assert_eq!(retry.delay_after(3), Duration::from_millis(350));
        assert_eq!(retry.delay_after(10), Duration::from_millis(350));
    }

    #[test]
    fn test_none_policy() {
        assert_eq!(RetryConfig::none().max_attempts, 1);
    }
}
