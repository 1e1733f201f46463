//! Configuration for the ingest module.

use serde::{Deserialize, Serialize};

/// Configuration for batch ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum links resolved and written concurrently within one batch.
    #[serde(default = "default_max_concurrent_links")]
    pub max_concurrent_links: usize,
}

fn default_max_concurrent_links() -> usize {
    4
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_concurrent_links: default_max_concurrent_links(),
        }
    }
}

impl IngestConfig {
    pub fn with_max_concurrent_links(mut self, max: usize) -> Self {
        self.max_concurrent_links = max;
        self
    }
}
