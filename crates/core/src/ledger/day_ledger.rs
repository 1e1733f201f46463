//! The day ledger: per-day append, list, refresh and delete.

use chrono::{NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{info, warn};

use super::error::LedgerError;
use super::store::LedgerStore;
use super::types::{
    DayKey, DeleteReport, FileRemoval, FileRemovalResult, LinkEntry, LinkOutcome, RefreshOutcome,
    RefreshStatus,
};
use crate::materializer::Materializer;
use crate::media::{Category, MediaTarget};
use crate::metrics;
use crate::planner;
use crate::strm::RemoveOutcome;

/// Exclusive hold on one DayLog. Writers for the same key wait on it.
pub struct DayLock {
    key: DayKey,
    _guard: OwnedMutexGuard<()>,
}

impl DayLock {
    pub fn key(&self) -> DayKey {
        self.key
    }
}

/// Append-only, day-partitioned record of processed links.
pub struct DayLedger {
    store: Arc<dyn LedgerStore>,
    materializer: Arc<Materializer>,
    locks: Mutex<HashMap<DayKey, Arc<AsyncMutex<()>>>>,
}

impl DayLedger {
    pub fn new(store: Arc<dyn LedgerStore>, materializer: Arc<Materializer>) -> Self {
        Self {
            store,
            materializer,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn materializer(&self) -> &Arc<Materializer> {
        &self.materializer
    }

    /// Wait for exclusive access to a DayLog.
    pub async fn lock(&self, key: DayKey) -> DayLock {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(key).or_default().clone()
        };
        DayLock {
            key,
            _guard: mutex.lock_owned().await,
        }
    }

    /// Record an outcome under a lock already held for the target's DayLog.
    pub fn append_locked(
        &self,
        lock: &DayLock,
        target: MediaTarget,
        raw_link: &str,
        outcome: LinkOutcome,
    ) -> Result<LinkEntry, LedgerError> {
        if target.category() != lock.key.category {
            return Err(LedgerError::KeyMismatch {
                locked: lock.key,
                category: target.category(),
            });
        }

        let entry = LinkEntry::new(target, raw_link, outcome, Utc::now());
        self.store.append(&lock.key, &entry)?;
        Ok(entry)
    }

    /// Record an outcome in today's DayLog for the target's category.
    pub async fn append(
        &self,
        target: MediaTarget,
        raw_link: &str,
        outcome: LinkOutcome,
    ) -> Result<LinkEntry, LedgerError> {
        let lock = self.lock(DayKey::today(target.category())).await;
        self.append_locked(&lock, target, raw_link, outcome)
    }

    /// Entries of a DayLog in arrival order. Empty if the DayLog does not exist.
    pub fn list(&self, category: Category, date: NaiveDate) -> Result<Vec<LinkEntry>, LedgerError> {
        Ok(self
            .store
            .load(&DayKey::new(category, date))?
            .map(|log| log.entries)
            .unwrap_or_default())
    }

    /// Dates with a DayLog in the category, newest first.
    pub fn list_days(&self, category: Category) -> Result<Vec<NaiveDate>, LedgerError> {
        self.store.list_days(category)
    }

    /// Re-resolve every entry of a DayLog and rewrite its `.strm` file.
    ///
    /// Entries are processed in arrival order, each as a fresh attempt, and
    /// written where they were written before (the planned path for entries
    /// that never resolved). A failure leaves the existing file as it was.
    /// Stored lines that do not decode are kept untouched. A provider auth failure
    /// stops the run; finished entries are still persisted and the rest are
    /// reported as skipped.
    pub async fn refresh(
        &self,
        category: Category,
        date: NaiveDate,
    ) -> Result<Vec<RefreshOutcome>, LedgerError> {
        let key = DayKey::new(category, date);
        let _lock = self.lock(key).await;
        let mut log = self.store.load(&key)?.ok_or(LedgerError::NotFound(key))?;

        let mut outcomes = Vec::with_capacity(log.entries.len());
        let mut auth_failure: Option<String> = None;

        for (index, entry) in log.entries.iter_mut().enumerate() {
            if auth_failure.is_some() {
                outcomes.push(RefreshOutcome {
                    index,
                    raw_link: entry.raw_link.clone(),
                    status: RefreshStatus::Skipped,
                    resolved_url: None,
                    strm_path: None,
                    error: None,
                });
                continue;
            }

            let strm_path = entry
                .strm_path
                .clone()
                .unwrap_or_else(|| planner::plan(&entry.target));
            let outcome = match self
                .materializer
                .materialize_at(&entry.target, &entry.raw_link, &strm_path)
                .await
            {
                Ok(done) => {
                    entry.apply(done.into());
                    RefreshOutcome {
                        index,
                        raw_link: entry.raw_link.clone(),
                        status: RefreshStatus::Refreshed,
                        resolved_url: entry.resolved_url.clone(),
                        strm_path: entry.strm_path.clone(),
                        error: None,
                    }
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!(
                        key = %key,
                        raw_link = %entry.raw_link,
                        error = %reason,
                        "Refresh failed for entry"
                    );
                    if e.is_batch_fatal() {
                        auth_failure = Some(reason.clone());
                    }
                    entry.apply(LinkOutcome::failed(reason.clone()));
                    RefreshOutcome {
                        index,
                        raw_link: entry.raw_link.clone(),
                        status: RefreshStatus::Failed,
                        resolved_url: None,
                        strm_path: None,
                        error: Some(reason),
                    }
                }
            };
            outcomes.push(outcome);
        }

        self.store.replace(&log)?;

        for outcome in &outcomes {
            metrics::REFRESH_ENTRIES
                .with_label_values(&[outcome.status.as_str()])
                .inc();
        }
        let refreshed = outcomes
            .iter()
            .filter(|o| o.status == RefreshStatus::Refreshed)
            .count();
        info!(
            key = %key,
            refreshed,
            total = outcomes.len(),
            unreadable = log.unreadable.len(),
            "Refreshed day log"
        );

        match auth_failure {
            Some(reason) => Err(LedgerError::ProviderAuth { reason, outcomes }),
            None => Ok(outcomes),
        }
    }

    /// Remove every `.strm` file a DayLog references, then the DayLog itself.
    ///
    /// File failures are reported, not fatal: the DayLog is discarded anyway.
    pub async fn delete(
        &self,
        category: Category,
        date: NaiveDate,
    ) -> Result<DeleteReport, LedgerError> {
        let key = DayKey::new(category, date);
        let _lock = self.lock(key).await;
        let log = self.store.load(&key)?.ok_or(LedgerError::NotFound(key))?;

        let writer = self.materializer.writer();
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for path in log
            .entries
            .iter()
            .filter(|e| e.is_resolved())
            .filter_map(|e| e.strm_path.as_ref())
        {
            if !seen.insert(path.clone()) {
                continue;
            }
            let result = match writer.remove(path).await {
                Ok(RemoveOutcome::Removed) => FileRemovalResult::Removed,
                Ok(RemoveOutcome::Missing) => FileRemovalResult::Missing,
                Err(e) => {
                    warn!(key = %key, path = %path.display(), error = %e, "Failed to remove strm file");
                    FileRemovalResult::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            metrics::STRM_FILES_REMOVED
                .with_label_values(&[result.as_str()])
                .inc();
            files.push(FileRemoval {
                path: path.clone(),
                result,
            });
        }

        if !log.unreadable.is_empty() {
            warn!(
                key = %key,
                lines = log.unreadable.len(),
                "Discarding undecodable log lines; files they name are left in place"
            );
        }
        self.store.remove(&key)?;
        metrics::DAY_LOGS_DELETED.inc();

        let report = DeleteReport {
            category,
            date,
            entries: log.entries.len(),
            unreadable_lines: log.unreadable.len(),
            files,
        };
        info!(
            key = %key,
            entries = report.entries,
            files = report.files.len(),
            failures = report.failures().count(),
            "Deleted day log"
        );
        Ok(report)
    }
}
