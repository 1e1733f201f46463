use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::ingest::IngestConfig;
use crate::resolver::{DebridConfig, RetryConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub debrid: DebridConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3001
}

/// Where `.strm` files and day logs live.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Jellyfin library root; `movies/` and `tv/` are created below it.
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,
    /// Day log root; `movies/` and `tv/` are created below it.
    #[serde(default = "default_log_root")]
    pub log_root: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            media_root: default_media_root(),
            log_root: default_log_root(),
        }
    }
}

fn default_media_root() -> PathBuf {
    PathBuf::from("/media")
}

fn default_log_root() -> PathBuf {
    PathBuf::from("/fetch_logs")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub debrid: SanitizedDebridConfig,
    pub library: LibraryConfig,
    pub ingest: IngestConfig,
}

/// Sanitized debrid config (API token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDebridConfig {
    pub base_url: String,
    pub api_token_configured: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub retry: RetryConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            debrid: SanitizedDebridConfig {
                base_url: config.debrid.base_url.clone(),
                api_token_configured: !config.debrid.api_token.trim().is_empty(),
                timeout_secs: config.debrid.timeout_secs,
                user_agent: config.debrid.user_agent.clone(),
                retry: config.debrid.retry.clone(),
            },
            library: config.library.clone(),
            ingest: config.ingest.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.library.media_root, PathBuf::from("/media"));
        assert_eq!(config.library.log_root, PathBuf::from("/fetch_logs"));
        assert_eq!(config.ingest.max_concurrent_links, 4);
        assert!(config.debrid.api_token.is_empty());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[debrid]
api_token = "secret"
timeout_secs = 10

[debrid.retry]
max_attempts = 5

[library]
media_root = "/srv/jellyfin"
log_root = "/srv/logs"

[ingest]
max_concurrent_links = 8
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.debrid.api_token, "secret");
        assert_eq!(config.debrid.timeout_secs, 10);
        assert_eq!(config.debrid.retry.max_attempts, 5);
        assert_eq!(config.debrid.retry.initial_delay_ms, 500);
        assert_eq!(config.library.media_root, PathBuf::from("/srv/jellyfin"));
        assert_eq!(config.ingest.max_concurrent_links, 8);
    }

    #[test]
    fn test_sanitized_config_hides_token() {
        let mut config = Config::default();
        config.debrid.api_token = "super-secret".to_string();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.debrid.api_token_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(json.contains("\"media_root\":\"/media\""));
    }
}
