//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the provider and writer
//! traits, allowing end-to-end tests of ingestion and the ledger without a
//! Real-Debrid account.
//!
//! # Example
//!
//! ```rust,ignore
//! use rdfin_core::testing::{MockResolver, MockStrmWriter};
//!
//! let resolver = MockResolver::new();
//! let writer = MockStrmWriter::new(temp.path());
//!
//! // Configure mock responses
//! resolver.set_url("https://host/a", "https://cdn/a").await;
//! writer.fail_path("movies/B/B.strm").await;
//!
//! // Wire into a Materializer...
//! ```

mod mock_resolver;
mod mock_strm_writer;

pub use mock_resolver::MockResolver;
pub use mock_strm_writer::{MockStrmWriter, RecordedWrite};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::ingest::{IngestBatch, IngestItem};
    use crate::media::{Category, MediaTarget};

    /// A raw link in the shape Real-Debrid hands out.
    pub fn raw_link(id: &str) -> String {
        format!("https://real-debrid.com/d/{}", id)
    }

    /// Create a movie target, panicking on invalid input.
    pub fn movie(title: &str) -> MediaTarget {
        MediaTarget::movie(title).expect("valid movie target")
    }

    /// Create an episode target, panicking on invalid input.
    pub fn episode(title: &str, season: u32, episode: u32) -> MediaTarget {
        MediaTarget::episode(title, season, episode).expect("valid episode target")
    }

    /// A movie batch with one link per title.
    pub fn movie_batch(titles: &[&str]) -> IngestBatch {
        IngestBatch::new(
            Category::Movie,
            titles
                .iter()
                .map(|t| IngestItem::new(movie(t), raw_link(&t.replace(' ', "-"))))
                .collect(),
        )
    }

    /// An episode batch for one season, numbering episodes from `first`.
    pub fn season_batch(show: &str, season: u32, first: u32, count: u32) -> IngestBatch {
        IngestBatch::new(
            Category::Episode,
            (first..first + count)
                .map(|e| {
                    IngestItem::new(
                        episode(show, season, e),
                        raw_link(&format!("{}-S{:02}E{:02}", show.replace(' ', "-"), season, e)),
                    )
                })
                .collect(),
        )
    }
}
