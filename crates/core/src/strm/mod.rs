//! Strm module for writing `.strm` pointer files into the media library.
//!
//! A `.strm` file holds a single URL followed by a newline; Jellyfin treats
//! it as a virtual media item.
//!
//! # Features
//!
//! - Atomic replace through a hidden sibling temp file and rename
//! - Automatic parent directory creation
//! - Pruning of empty title/season directories after removal
//! - Newest-first listing of the library for the "recently fetched" view

mod error;
mod fs_writer;
mod recent;
mod traits;
mod types;

pub use error::WriteError;
pub use fs_writer::FsStrmWriter;
pub use recent::recent_strm_files;
pub use traits::StrmWriter;
pub use types::{RemoveOutcome, StrmFileInfo, WriteReceipt};
