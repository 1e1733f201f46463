//! Types for the strm module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::media::Category;

/// Result of a successful `.strm` write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Library-relative path that was written.
    pub path: PathBuf,
    /// Bytes written, including the trailing newline.
    pub bytes: u64,
    /// Whether an existing file was replaced.
    pub replaced: bool,
}

/// Result of removing a `.strm` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed,
    /// Nothing was on disk.
    Missing,
}

/// A `.strm` file found in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrmFileInfo {
    /// Library-relative path with `/` separators.
    pub path: String,
    pub category: Category,
    pub modified: DateTime<Utc>,
}
