//! Ingestion of submitted links.
//!
//! A batch shares one category. Each link goes through
//! resolve → plan → write on its own; a failed link becomes a failed ledger
//! entry and never stops its siblings. Only a provider authentication
//! failure stops the batch, since every later call would fail the same way.

mod config;
mod orchestrator;
mod types;

pub use config::IngestConfig;
pub use orchestrator::IngestOrchestrator;
pub use types::{IngestBatch, IngestError, IngestItem};
