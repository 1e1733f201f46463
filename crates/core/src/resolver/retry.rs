//! Bounded retry around a single resolver.

use std::time::Instant;

use tracing::{debug, warn};

use super::config::RetryConfig;
use super::error::ResolveError;
use super::traits::LinkResolver;
use super::types::ResolvedLink;
use crate::metrics;

/// Resolve a link, retrying `ProviderUnavailable` with exponential backoff.
///
/// Any other failure is returned immediately. At most `max_attempts` calls
/// are made (minimum one).
pub async fn resolve_with_retry(
    resolver: &dyn LinkResolver,
    raw_link: &str,
    retry: &RetryConfig,
) -> Result<ResolvedLink, ResolveError> {
    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let started = Instant::now();
        let result = resolver.resolve(raw_link).await;
        metrics::RESOLVE_DURATION
            .with_label_values(&[])
            .observe(started.elapsed().as_secs_f64());

        match result {
            Ok(link) => {
                metrics::RESOLVE_ATTEMPTS.with_label_values(&["ok"]).inc();
                if attempt > 1 {
                    debug!(
                        resolver = resolver.name(),
                        attempt, "Link resolved after retry"
                    );
                }
                return Ok(link);
            }
            Err(e) => {
                metrics::RESOLVE_ATTEMPTS
                    .with_label_values(&[e.kind()])
                    .inc();

                if !e.is_retryable() || attempt >= max_attempts {
                    return Err(e);
                }

                let delay = retry.delay_after(attempt);
                warn!(
                    resolver = resolver.name(),
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Provider unavailable, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
