//! Ledger storage trait.

use chrono::NaiveDate;

use super::error::LedgerError;
use super::types::{DayKey, DayLog, LinkEntry};
use crate::media::Category;

/// Trait for DayLog storage backends.
///
/// Implementations do no locking across calls; [`super::DayLedger`]
/// serializes writers per key.
pub trait LedgerStore: Send + Sync {
    /// Load a DayLog. `None` if it was never created or has been removed.
    fn load(&self, key: &DayKey) -> Result<Option<DayLog>, LedgerError>;

    /// Append one entry, creating the DayLog if absent.
    fn append(&self, key: &DayKey, entry: &LinkEntry) -> Result<(), LedgerError>;

    /// Replace a DayLog's entries as a whole.
    fn replace(&self, log: &DayLog) -> Result<(), LedgerError>;

    /// Remove a DayLog. Returns whether it existed.
    fn remove(&self, key: &DayKey) -> Result<bool, LedgerError>;

    /// Dates that have a DayLog in the category, newest first.
    fn list_days(&self, category: Category) -> Result<Vec<NaiveDate>, LedgerError>;
}
