//! Mock link resolver for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::resolver::{check_raw_link, LinkResolver, ResolveError, ResolvedLink};

type Scripted = Result<ResolvedLink, ResolveError>;

/// Mock implementation of the LinkResolver trait.
///
/// Provides controllable behavior for testing:
/// - Deterministic stream URLs by default (see [`MockResolver::url_for`])
/// - Per-link scripted responses
/// - A queue of errors consumed by the next calls, whatever the link
/// - Simulated latency and in-flight call tracking
///
/// # Example
///
/// ```rust,ignore
/// use rdfin_core::testing::MockResolver;
///
/// let resolver = MockResolver::new();
/// resolver
///     .set_response("https://host/gone", Err(ResolveError::NotCached("gone".into())))
///     .await;
///
/// let link = resolver.resolve("https://host/ok").await?;
/// assert_eq!(link.url, MockResolver::url_for("https://host/ok"));
/// assert_eq!(resolver.calls().await.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockResolver {
    /// Scripted responses keyed by trimmed raw link.
    responses: Arc<RwLock<HashMap<String, Scripted>>>,
    /// Errors returned by the next calls, in order.
    queued_errors: Arc<RwLock<VecDeque<ResolveError>>>,
    /// Recorded raw links, in call order.
    calls: Arc<RwLock<Vec<String>>>,
    /// Simulated latency in milliseconds.
    delay_ms: Arc<RwLock<u64>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResolver {
    /// Create a new mock resolver that resolves every valid link.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            queued_errors: Arc::new(RwLock::new(VecDeque::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            delay_ms: Arc::new(RwLock::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Stream URL returned for an unscripted link.
    pub fn url_for(raw_link: &str) -> String {
        format!(
            "https://stream.mock-debrid.test/d/{}",
            urlencoding::encode(raw_link.trim())
        )
    }

    /// Script the response for a specific link. Replaces any earlier script.
    pub async fn set_response(&self, raw_link: &str, response: Scripted) {
        self.responses
            .write()
            .await
            .insert(raw_link.trim().to_string(), response);
    }

    /// Resolve a link to a specific URL.
    pub async fn set_url(&self, raw_link: &str, url: &str) {
        self.set_response(raw_link, Ok(ResolvedLink::new(url))).await;
    }

    /// Remove all scripted responses.
    pub async fn clear_responses(&self) {
        self.responses.write().await.clear();
    }

    /// Queue an error for the next call, whatever its link.
    pub async fn push_error(&self, error: ResolveError) {
        self.queued_errors.write().await.push_back(error);
    }

    /// Set the simulated latency of every call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay_ms.write().await = delay.as_millis() as u64;
    }

    /// Get all recorded calls.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// Highest number of concurrent calls observed.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn respond(&self, raw_link: &str) -> Scripted {
        if let Some(error) = self.queued_errors.write().await.pop_front() {
            return Err(error);
        }
        if let Some(scripted) = self.responses.read().await.get(raw_link) {
            return scripted.clone();
        }
        let link = check_raw_link(raw_link)?;
        let filename = link.rsplit('/').next().unwrap_or(link);
        Ok(ResolvedLink::new(Self::url_for(link)).with_filename(format!("{}.mkv", filename)))
    }
}

#[async_trait]
impl LinkResolver for MockResolver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn resolve(&self, raw_link: &str) -> Result<ResolvedLink, ResolveError> {
        let raw_link = raw_link.trim();
        self.calls.write().await.push(raw_link.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay_ms = *self.delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        let result = self.respond(raw_link).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
