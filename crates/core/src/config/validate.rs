use super::{types::Config, ConfigError};

fn invalid(message: &str) -> Result<(), ConfigError> {
    Err(ConfigError::ValidationError(message.to_string()))
}

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - A Real-Debrid API token is present
/// - The API base URL is an http(s) URL
/// - Timeouts, retry attempts and the worker bound are positive
/// - Media and log roots are distinct
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return invalid("server.port cannot be 0");
    }

    let debrid = &config.debrid;
    if debrid.api_token.trim().is_empty() {
        return invalid("debrid.api_token is required (or set REALDEBRID_TOKEN)");
    }
    if !debrid.base_url.starts_with("http://") && !debrid.base_url.starts_with("https://") {
        return invalid("debrid.base_url must be an http(s) URL");
    }
    if debrid.timeout_secs == 0 {
        return invalid("debrid.timeout_secs cannot be 0");
    }
    if debrid.retry.max_attempts == 0 {
        return invalid("debrid.retry.max_attempts must be at least 1");
    }
    if debrid.retry.backoff_multiplier < 1.0 {
        return invalid("debrid.retry.backoff_multiplier must be at least 1.0");
    }

    if config.ingest.max_concurrent_links == 0 {
        return invalid("ingest.max_concurrent_links must be at least 1");
    }

    if config.library.media_root == config.library.log_root {
        return invalid("library.media_root and library.log_root must differ");
    }

    Ok(())
}
