//! Day ledger for processed links.
//!
//! Every submitted link is recorded, success or failure, in a DayLog keyed
//! by category and UTC date. A DayLog can later be refreshed (every link
//! re-resolved and its `.strm` file rewritten) or deleted together with the
//! files it references.
//!
//! Storage is pluggable through [`LedgerStore`]:
//!
//! - [`FsLedgerStore`]: `<log root>/<movies|tv>/<YYYY-MM-DD>.log`, one line per entry
//! - [`MemoryLedgerStore`]: in-process, for tests and embedding

mod codec;
mod day_ledger;
mod error;
mod fs_store;
mod memory_store;
mod store;
mod types;

pub use codec::{decode_line, encode_entry};
pub use day_ledger::{DayLedger, DayLock};
pub use error::LedgerError;
pub use fs_store::FsLedgerStore;
pub use memory_store::MemoryLedgerStore;
pub use store::LedgerStore;
pub use types::{
    DayKey, DayLog, DeleteReport, FileRemoval, FileRemovalResult, LinkEntry, LinkOutcome,
    LinkStatus, RefreshOutcome, RefreshStatus, UnreadableLine,
};
