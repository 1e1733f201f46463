//! Batch ingestion: resolve, write and record a set of links.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::config::IngestConfig;
use super::types::{IngestBatch, IngestError};
use crate::ledger::{DayKey, DayLedger, LinkEntry, LinkOutcome};
use crate::metrics;
use crate::planner;

/// Entry point for submitted links.
pub struct IngestOrchestrator {
    ledger: Arc<DayLedger>,
    config: IngestConfig,
}

impl IngestOrchestrator {
    pub fn new(ledger: Arc<DayLedger>, config: IngestConfig) -> Self {
        Self { ledger, config }
    }

    pub fn ledger(&self) -> &Arc<DayLedger> {
        &self.ledger
    }

    /// Materialize every link of a batch and record each outcome in today's
    /// DayLog for the batch category.
    ///
    /// Links run concurrently up to `max_concurrent_links`. The DayLog is
    /// locked only while the outcomes are appended, so a batch's entries are
    /// contiguous and in submission order.
    pub async fn ingest(&self, batch: IngestBatch) -> Result<Vec<LinkEntry>, IngestError> {
        batch.validate()?;

        let started = Instant::now();
        let category = batch.category;

        let materializer = self.ledger.materializer();
        let semaphore = Semaphore::new(self.config.max_concurrent_links.max(1));
        let abort = AtomicBool::new(false);

        let attempts = batch.items.iter().map(|item| {
            let semaphore = &semaphore;
            let abort = &abort;
            async move {
                let _permit = semaphore.acquire().await.ok()?;
                if abort.load(Ordering::SeqCst) {
                    return None;
                }
                let result = match &item.target {
                    Some(target) => materializer.materialize(target, &item.raw_link).await,
                    None => materializer.materialize_movie(&item.raw_link).await,
                };
                if matches!(&result, Err(e) if e.is_batch_fatal()) {
                    abort.store(true, Ordering::SeqCst);
                }
                Some(result)
            }
        });
        let results = futures::future::join_all(attempts).await;

        let lock = self.ledger.lock(DayKey::today(category)).await;
        let mut entries = Vec::with_capacity(results.len());
        let mut auth_failure: Option<String> = None;
        let mut skipped = 0usize;

        for (item, result) in batch.items.into_iter().zip(results) {
            let Some(result) = result else {
                skipped += 1;
                metrics::LINKS_PROCESSED
                    .with_label_values(&[category.as_str(), "skipped"])
                    .inc();
                continue;
            };

            let target = match (&result, item.target) {
                (Ok(done), _) => done.target.clone(),
                (Err(_), Some(target)) => target,
                (Err(_), None) => planner::movie_named_after(None, &[item.raw_link.as_str()]),
            };
            if let Err(e) = &result {
                warn!(
                    raw_link = %item.raw_link,
                    media = %target,
                    error = %e,
                    "Link failed"
                );
                if e.is_batch_fatal() && auth_failure.is_none() {
                    auth_failure = Some(e.to_string());
                }
            }

            let outcome = LinkOutcome::from(result);
            let label = if outcome.is_resolved() { "ok" } else { "failed" };
            let entry = self
                .ledger
                .append_locked(&lock, target, &item.raw_link, outcome)?;
            metrics::LINKS_PROCESSED
                .with_label_values(&[category.as_str(), label])
                .inc();
            entries.push(entry);
        }
        drop(lock);

        let resolved = entries.iter().filter(|e| e.is_resolved()).count();
        info!(
            category = %category,
            resolved,
            failed = entries.len() - resolved,
            skipped,
            duration_ms = started.elapsed().as_millis() as u64,
            "Ingested batch"
        );

        match auth_failure {
            Some(reason) => Err(IngestError::ProviderAuth {
                reason,
                processed: entries,
            }),
            None => Ok(entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedgerStore;
    use crate::materializer::Materializer;
    use crate::media::Category;
    use crate::resolver::{ResolveError, RetryConfig};
    use crate::strm::FsStrmWriter;
    use crate::ingest::IngestItem;
    use crate::media::MediaTarget;
    use crate::testing::{fixtures, MockResolver};
    use chrono::Utc;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn orchestrator(resolver: Arc<MockResolver>, root: &std::path::Path, max: usize) -> IngestOrchestrator {
        let materializer = Materializer::new(
            resolver,
            Arc::new(FsStrmWriter::new(root)),
            RetryConfig::none(),
        );
        let ledger = DayLedger::new(Arc::new(MemoryLedgerStore::new()), Arc::new(materializer));
        IngestOrchestrator::new(
            Arc::new(ledger),
            IngestConfig::default().with_max_concurrent_links(max),
        )
    }

    #[tokio::test]
    async fn test_ingest_movie() {
        let temp = TempDir::new().unwrap();
        let o = orchestrator(Arc::new(MockResolver::new()), temp.path(), 4);

        let entries = o.ingest(fixtures::movie_batch(&["Arrival"])).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_resolved());
        assert_eq!(
            entries[0].strm_path,
            Some(PathBuf::from("movies/Arrival/Arrival.strm"))
        );
        let listed = o
            .ledger()
            .list(Category::Movie, Utc::now().date_naive())
            .unwrap();
        assert_eq!(listed, entries);
    }

    #[tokio::test]
    async fn test_ingest_rejects_invalid_batch_without_side_effects() {
        let temp = TempDir::new().unwrap();
        let resolver = Arc::new(MockResolver::new());
        let o = orchestrator(resolver.clone(), temp.path(), 4);

        let mut batch = fixtures::movie_batch(&["A"]);
        batch.category = Category::Episode;

        assert!(matches!(
            o.ingest(batch).await,
            Err(IngestError::InvalidBatch(_))
        ));
        assert!(resolver.calls().await.is_empty());
        assert!(o
            .ledger()
            .list_days(Category::Episode)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let temp = TempDir::new().unwrap();
        let resolver = Arc::new(MockResolver::new());
        resolver.set_delay(Duration::from_millis(20)).await;
        let o = orchestrator(resolver.clone(), temp.path(), 2);

        let entries = o
            .ingest(fixtures::season_batch("Foo", 1, 1, 6))
            .await
            .unwrap();

        assert_eq!(entries.len(), 6);
        assert!(resolver.max_concurrent_calls() <= 2);
        let episodes: Vec<Option<u32>> =
            entries.iter().map(|e| e.target.episode_number()).collect();
        assert_eq!(
            episodes,
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]
        );
    }

    #[tokio::test]
    async fn test_auth_failure_aborts_remaining_links() {
        let temp = TempDir::new().unwrap();
        let resolver = Arc::new(MockResolver::new());
        let o = orchestrator(resolver.clone(), temp.path(), 1);
        let batch = fixtures::movie_batch(&["A", "B", "C"]);
        resolver
            .set_response(
                &batch.items[1].raw_link,
                Err(ResolveError::ProviderAuth("bad_token".into())),
            )
            .await;

        let err = o.ingest(batch).await.unwrap_err();

        let processed = match err {
            IngestError::ProviderAuth { processed, .. } => processed,
            other => panic!("expected ProviderAuth, got {:?}", other),
        };
        assert_eq!(processed.len(), 2);
        assert!(processed[0].is_resolved());
        assert!(!processed[1].is_resolved());
        assert_eq!(resolver.calls().await.len(), 2);
        assert_eq!(
            o.ledger()
                .list(Category::Movie, Utc::now().date_naive())
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_links_resolve_while_day_log_is_locked() {
        let temp = TempDir::new().unwrap();
        let resolver = Arc::new(MockResolver::new());
        let o = Arc::new(orchestrator(resolver.clone(), temp.path(), 4));

        let lock = o.ledger().lock(DayKey::today(Category::Movie)).await;
        let task = tokio::spawn({
            let o = Arc::clone(&o);
            async move { o.ingest(fixtures::movie_batch(&["A", "B"])).await }
        });

        tokio::time::timeout(Duration::from_secs(5), async {
            while resolver.calls().await.len() < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("links should resolve while the DayLog is locked");
        assert!(!task.is_finished());

        drop(lock);
        let entries = task.await.unwrap().unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_untitled_movies_are_named_by_provider() {
        let temp = TempDir::new().unwrap();
        let resolver = Arc::new(MockResolver::new());
        let o = orchestrator(resolver.clone(), temp.path(), 2);
        resolver
            .set_response(
                "https://h/d/gone",
                Err(ResolveError::NotCached("gone".into())),
            )
            .await;

        let batch = IngestBatch::new(
            Category::Movie,
            vec![
                IngestItem::untitled_movie("https://h/d/Heat"),
                IngestItem::untitled_movie("https://h/d/gone"),
            ],
        );
        let entries = o.ingest(batch).await.unwrap();

        assert_eq!(entries[0].target, MediaTarget::movie("Heat").unwrap());
        assert_eq!(
            entries[0].strm_path,
            Some(PathBuf::from("movies/Heat/Heat.strm"))
        );
        assert!(temp.path().join("movies/Heat/Heat.strm").exists());
        assert!(!entries[1].is_resolved());
        assert_eq!(entries[1].target, MediaTarget::movie("gone").unwrap());
    }
}
