pub mod config;
pub mod ingest;
pub mod ledger;
pub mod materializer;
pub mod media;
pub mod metrics;
pub mod planner;
pub mod resolver;
pub mod strm;
pub mod testing;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, LibraryConfig, SanitizedConfig, ServerConfig,
};
pub use ingest::{IngestBatch, IngestConfig, IngestError, IngestItem, IngestOrchestrator};
pub use ledger::{
    DayKey, DayLedger, DayLog, DeleteReport, FileRemoval, FileRemovalResult, FsLedgerStore,
    LedgerError, LedgerStore, LinkEntry, LinkOutcome, LinkStatus, MemoryLedgerStore,
    RefreshOutcome, RefreshStatus,
};
pub use materializer::{MaterializeError, Materialized, Materializer};
pub use media::{Category, MediaTarget, TargetError};
pub use planner::{plan, PathSanitizer};
pub use resolver::{
    DebridConfig, LinkResolver, RealDebridResolver, ResolveError, ResolvedLink, RetryConfig,
};
pub use strm::{
    recent_strm_files, FsStrmWriter, RemoveOutcome, StrmFileInfo, StrmWriter, WriteError,
    WriteReceipt,
};
