//! Error types for the ledger module.

use thiserror::Error;

use super::types::{DayKey, RefreshOutcome};
use crate::media::Category;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// No DayLog exists for the key.
    #[error("No log for {0}")]
    NotFound(DayKey),

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored line could not be decoded.
    #[error("Malformed log line: {0}")]
    Codec(String),

    /// An entry was appended under a lock held for another partition.
    #[error("Entry category {category} does not match locked log {locked}")]
    KeyMismatch { locked: DayKey, category: Category },

    /// Refresh stopped because the provider rejected the credentials.
    /// Outcomes cover every entry; those after the failure are skipped.
    /// `reason` is the failing entry's error message.
    #[error("{reason}")]
    ProviderAuth {
        reason: String,
        outcomes: Vec<RefreshOutcome>,
    },
}

impl LedgerError {
    pub fn storage(context: &str, error: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{}: {}", context, error))
    }
}
