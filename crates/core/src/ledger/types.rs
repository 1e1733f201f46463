//! Types for the ledger module.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::materializer::{MaterializeError, Materialized};
use crate::media::{Category, MediaTarget};

/// Identifies one DayLog: a category partition on a UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayKey {
    pub category: Category,
    pub date: NaiveDate,
}

impl DayKey {
    pub fn new(category: Category, date: NaiveDate) -> Self {
        Self { category, date }
    }

    /// Key for today's log (UTC).
    pub fn today(category: Category) -> Self {
        Self::new(category, Utc::now().date_naive())
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category.dir_name(), self.date.format("%Y-%m-%d"))
    }
}

/// Outcome of the last attempt for a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Resolved,
    Failed,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Resolved => "resolved",
            LinkStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resolved" => Ok(LinkStatus::Resolved),
            "failed" => Ok(LinkStatus::Failed),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// What happened to a link, as handed to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Resolved {
        url: String,
        strm_path: PathBuf,
        filename: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    },
    Failed {
        reason: String,
    },
}

impl LinkOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

impl From<Materialized> for LinkOutcome {
    fn from(m: Materialized) -> Self {
        Self::Resolved {
            url: m.resolved.url,
            strm_path: m.strm_path,
            filename: m.resolved.filename,
            expires_at: m.resolved.expires_at,
        }
    }
}

impl From<Result<Materialized, MaterializeError>> for LinkOutcome {
    fn from(result: Result<Materialized, MaterializeError>) -> Self {
        match result {
            Ok(m) => m.into(),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

/// One submitted link and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub raw_link: String,
    pub target: MediaTarget,
    pub status: LinkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_url: Option<String>,
    /// Library-relative path of the `.strm` file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strm_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl LinkEntry {
    /// Build an entry from an outcome.
    pub fn new(
        target: MediaTarget,
        raw_link: impl Into<String>,
        outcome: LinkOutcome,
        added_at: DateTime<Utc>,
    ) -> Self {
        let mut entry = Self {
            raw_link: raw_link.into(),
            target,
            status: LinkStatus::Failed,
            resolved_url: None,
            strm_path: None,
            filename: None,
            expires_at: None,
            error_reason: None,
            added_at,
        };
        entry.apply(outcome);
        entry
    }

    pub fn is_resolved(&self) -> bool {
        self.status == LinkStatus::Resolved
    }

    /// Apply a refresh outcome.
    ///
    /// A failure never clears stored values from an earlier success; it only
    /// updates the reason on entries that were already failed.
    pub fn apply(&mut self, outcome: LinkOutcome) {
        match outcome {
            LinkOutcome::Resolved {
                url,
                strm_path,
                filename,
                expires_at,
            } => {
                self.status = LinkStatus::Resolved;
                self.resolved_url = Some(url);
                self.strm_path = Some(strm_path);
                self.filename = filename;
                self.expires_at = expires_at;
                self.error_reason = None;
            }
            LinkOutcome::Failed { reason } => {
                if self.status == LinkStatus::Failed {
                    self.error_reason = Some(reason);
                }
            }
        }
    }
}

/// A stored line that does not decode to an entry. Kept verbatim so a
/// rewrite of its DayLog leaves it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadableLine {
    /// Number of entries that precede the line.
    pub position: usize,
    pub text: String,
}

/// All entries recorded for one category on one day, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLog {
    pub category: Category,
    pub date: NaiveDate,
    pub entries: Vec<LinkEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreadable: Vec<UnreadableLine>,
}

impl DayLog {
    pub fn new(key: DayKey) -> Self {
        Self {
            category: key.category,
            date: key.date,
            entries: Vec::new(),
            unreadable: Vec::new(),
        }
    }

    pub fn key(&self) -> DayKey {
        DayKey::new(self.category, self.date)
    }
}

/// Per-entry result of a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    Refreshed,
    Failed,
    /// Not attempted because the provider rejected our credentials.
    Skipped,
}

impl RefreshStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshStatus::Refreshed => "refreshed",
            RefreshStatus::Failed => "failed",
            RefreshStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// Position of the entry in its DayLog.
    pub index: usize,
    pub raw_link: String,
    pub status: RefreshStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strm_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What happened to one `.strm` file during day deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FileRemovalResult {
    Removed,
    Missing,
    Failed { reason: String },
}

impl FileRemovalResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRemovalResult::Removed => "removed",
            FileRemovalResult::Missing => "missing",
            FileRemovalResult::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRemoval {
    pub path: PathBuf,
    #[serde(flatten)]
    pub result: FileRemovalResult,
}

/// Summary of a day deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub category: Category,
    pub date: NaiveDate,
    /// Number of ledger entries discarded.
    pub entries: usize,
    /// Stored lines discarded without being decoded; their files, if any,
    /// are left alone.
    pub unreadable_lines: usize,
    pub files: Vec<FileRemoval>,
}

impl DeleteReport {
    /// Files that could not be removed.
    pub fn failures(&self) -> impl Iterator<Item = &FileRemoval> {
        self.files
            .iter()
            .filter(|f| matches!(f.result, FileRemovalResult::Failed { .. }))
    }
}
