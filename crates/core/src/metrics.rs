//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Link processing (ingest outcomes per category)
//! - Provider calls (resolve attempts and latency)
//! - Ledger maintenance (refresh and delete)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Ingest Metrics
// =============================================================================

/// Links processed total by category and result.
pub static LINKS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rdfin_links_processed_total", "Total links processed"),
        &["category", "result"], // result: "ok", "failed", "skipped"
    )
    .unwrap()
});

// =============================================================================
// Provider Metrics
// =============================================================================

/// Resolve attempts total by result.
pub static RESOLVE_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "rdfin_resolve_attempts_total",
            "Total provider resolve attempts, including retries",
        ),
        &["result"], // "ok" or a ResolveError kind
    )
    .unwrap()
});

/// Resolve call duration in seconds.
pub static RESOLVE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "rdfin_resolve_duration_seconds",
            "Duration of single provider resolve calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Ledger Metrics
// =============================================================================

/// Ledger entries re-resolved during refresh, by result.
pub static REFRESH_ENTRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "rdfin_refresh_entries_total",
            "Total ledger entries handled by refresh",
        ),
        &["result"], // "refreshed", "failed", "skipped"
    )
    .unwrap()
});

/// `.strm` files removed by day deletion, by result.
pub static STRM_FILES_REMOVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "rdfin_strm_files_removed_total",
            "Total .strm removals attempted by day deletion",
        ),
        &["result"], // "removed", "missing", "failed"
    )
    .unwrap()
});

/// Day logs deleted total.
pub static DAY_LOGS_DELETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("rdfin_day_logs_deleted_total", "Total day logs deleted").unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Ingest
        Box::new(LINKS_PROCESSED.clone()),
        // Provider
        Box::new(RESOLVE_ATTEMPTS.clone()),
        Box::new(RESOLVE_DURATION.clone()),
        // Ledger
        Box::new(REFRESH_ENTRIES.clone()),
        Box::new(STRM_FILES_REMOVED.clone()),
        Box::new(DAY_LOGS_DELETED.clone()),
    ]
}
