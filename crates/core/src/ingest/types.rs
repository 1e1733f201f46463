//! Types for the ingest module.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::{LedgerError, LinkEntry};
use crate::media::{Category, MediaTarget};

/// One link to materialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestItem {
    /// `None` for a movie to be named after the provider's filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<MediaTarget>,
    pub raw_link: String,
}

impl IngestItem {
    pub fn new(target: MediaTarget, raw_link: impl Into<String>) -> Self {
        Self {
            target: Some(target),
            raw_link: raw_link.into(),
        }
    }

    /// A movie link submitted without a title.
    pub fn untitled_movie(raw_link: impl Into<String>) -> Self {
        Self {
            target: None,
            raw_link: raw_link.into(),
        }
    }

    pub fn category(&self) -> Category {
        self.target
            .as_ref()
            .map_or(Category::Movie, MediaTarget::category)
    }
}

/// Links submitted together, all in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestBatch {
    pub category: Category,
    pub items: Vec<IngestItem>,
}

impl IngestBatch {
    pub fn new(category: Category, items: Vec<IngestItem>) -> Self {
        Self { category, items }
    }

    /// Check the batch before anything is resolved or written.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.items.is_empty() {
            return Err(IngestError::InvalidBatch("batch has no links".to_string()));
        }
        if let Some((index, item)) = self
            .items
            .iter()
            .enumerate()
            .find(|(_, item)| item.category() != self.category)
        {
            return Err(IngestError::InvalidBatch(format!(
                "item {} is a {} in a {} batch",
                index + 1,
                item.category(),
                self.category
            )));
        }
        Ok(())
    }
}

/// Errors that stop a batch as a whole.
///
/// Per-link failures are not errors: they are recorded as failed entries.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The batch was rejected before any link was processed.
    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    /// The provider rejected our credentials. Links not yet started were
    /// skipped; `processed` holds the entries that were recorded.
    /// `reason` is the failing link's error message.
    #[error("{reason}")]
    ProviderAuth {
        reason: String,
        processed: Vec<LinkEntry>,
    },

    /// The ledger could not record an entry.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_batch() {
        let batch = IngestBatch::new(Category::Movie, vec![]);
        assert!(matches!(batch.validate(), Err(IngestError::InvalidBatch(_))));
    }

    #[test]
    fn test_validate_rejects_mixed_categories() {
        let batch = IngestBatch::new(
            Category::Movie,
            vec![
                IngestItem::new(MediaTarget::movie("A").unwrap(), "https://h/a"),
                IngestItem::new(MediaTarget::episode("B", 1, 1).unwrap(), "https://h/b"),
            ],
        );
        let err = batch.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid batch: item 2 is a episode in a movie batch"
        );
    }

    #[test]
    fn test_batch_deserializes_from_json() {
        let json = r#"{
            "category": "episode",
            "items": [
                {"target": {"category": "episode", "title": "Foo", "season": 1, "episode": 3},
                 "raw_link": "https://h/e3"}
            ]
        }"#;
        let batch: IngestBatch = serde_json::from_str(json).unwrap();
        assert!(batch.validate().is_ok());
        assert_eq!(
            batch.items[0].target,
            Some(MediaTarget::episode("Foo", 1, 3).unwrap())
        );
    }

    #[test]
    fn test_untitled_items_only_in_movie_batches() {
        let movies = IngestBatch::new(
            Category::Movie,
            vec![IngestItem::untitled_movie("https://h/a")],
        );
        assert!(movies.validate().is_ok());

        let episodes = IngestBatch::new(
            Category::Episode,
            vec![IngestItem::untitled_movie("https://h/a")],
        );
        assert!(matches!(episodes.validate(), Err(IngestError::InvalidBatch(_))));
    }

    #[test]
    fn test_untitled_item_deserializes_without_target() {
        let item: IngestItem = serde_json::from_str(r#"{"raw_link": "https://h/a"}"#).unwrap();
        assert_eq!(item, IngestItem::untitled_movie("https://h/a"));
    }
}
