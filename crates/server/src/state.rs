use std::path::Path;
use std::sync::Arc;
use rdfin_core::{Config, DayLedger, IngestOrchestrator, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<IngestOrchestrator>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<IngestOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &IngestOrchestrator {
        self.orchestrator.as_ref()
    }

    pub fn ledger(&self) -> &DayLedger {
        self.orchestrator.ledger()
    }

    pub fn media_root(&self) -> &Path {
        &self.config.library.media_root
    }
}
