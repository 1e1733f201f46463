//! In-memory DayLog store.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::RwLock;

use super::error::LedgerError;
use super::store::LedgerStore;
use super::types::{DayKey, DayLog, LinkEntry};
use crate::media::Category;

/// Ledger store that keeps everything in memory. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    logs: RwLock<HashMap<DayKey, DayLog>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> LedgerError {
    LedgerError::Storage("memory store lock poisoned".to_string())
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self, key: &DayKey) -> Result<Option<DayLog>, LedgerError> {
        Ok(self.logs.read().map_err(poisoned)?.get(key).cloned())
    }

    fn append(&self, key: &DayKey, entry: &LinkEntry) -> Result<(), LedgerError> {
        self.logs
            .write()
            .map_err(poisoned)?
            .entry(*key)
            .or_insert_with(|| DayLog::new(*key))
            .entries
            .push(entry.clone());
        Ok(())
    }

    fn replace(&self, log: &DayLog) -> Result<(), LedgerError> {
        self.logs
            .write()
            .map_err(poisoned)?
            .insert(log.key(), log.clone());
        Ok(())
    }

    fn remove(&self, key: &DayKey) -> Result<bool, LedgerError> {
        Ok(self.logs.write().map_err(poisoned)?.remove(key).is_some())
    }

    fn list_days(&self, category: Category) -> Result<Vec<NaiveDate>, LedgerError> {
        let mut days: Vec<NaiveDate> = self
            .logs
            .read()
            .map_err(poisoned)?
            .keys()
            .filter(|k| k.category == category)
            .map(|k| k.date)
            .collect();
        days.sort_unstable_by(|a, b| b.cmp(a));
        Ok(days)
    }
}
