//! Plain-text DayLog store: `<log root>/<movies|tv>/<YYYY-MM-DD>.log`.

use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use super::codec::{decode_line, encode_entry};
use super::error::LedgerError;
use super::store::LedgerStore;
use super::types::{DayKey, DayLog, LinkEntry, UnreadableLine};
use crate::media::Category;

const LOG_EXTENSION: &str = "log";

/// File-backed ledger store, one text file per DayLog.
pub struct FsLedgerStore {
    root: PathBuf,
}

impl FsLedgerStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.dir_name())
    }

    /// Path of the file backing a DayLog.
    pub fn log_path(&self, key: &DayKey) -> PathBuf {
        self.category_dir(key.category).join(format!(
            "{}.{}",
            key.date.format("%Y-%m-%d"),
            LOG_EXTENSION
        ))
    }

    fn ensure_dir(&self, category: Category) -> Result<PathBuf, LedgerError> {
        let dir = self.category_dir(category);
        fs::create_dir_all(&dir)
            .map_err(|e| LedgerError::storage(&format!("create {}", dir.display()), e))?;
        Ok(dir)
    }
}

impl LedgerStore for FsLedgerStore {
    fn load(&self, key: &DayKey) -> Result<Option<DayLog>, LedgerError> {
        let path = self.log_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LedgerError::storage(&format!("read {}", path.display()), e)),
        };

        let mut log = DayLog::new(*key);
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match decode_line(line, key.category) {
                Ok(entry) => log.entries.push(entry),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        line = number + 1,
                        error = %e,
                        "Keeping undecodable log line as is"
                    );
                    log.unreadable.push(UnreadableLine {
                        position: log.entries.len(),
                        text: line.to_string(),
                    });
                }
            }
        }

        Ok(Some(log))
    }

    fn append(&self, key: &DayKey, entry: &LinkEntry) -> Result<(), LedgerError> {
        self.ensure_dir(key.category)?;
        let path = self.log_path(key);
        let mut line = encode_entry(entry);
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LedgerError::storage(&format!("open {}", path.display()), e))?;
        // One write per entry keeps lines whole under O_APPEND.
        file.write_all(line.as_bytes())
            .map_err(|e| LedgerError::storage(&format!("append {}", path.display()), e))?;
        Ok(())
    }

    fn replace(&self, log: &DayLog) -> Result<(), LedgerError> {
        let dir = self.ensure_dir(log.category)?;
        let path = self.log_path(&log.key());

        let mut content = String::new();
        let mut unreadable = log.unreadable.iter().peekable();
        for (index, entry) in log.entries.iter().enumerate() {
            while let Some(line) = unreadable.next_if(|l| l.position <= index) {
                content.push_str(&line.text);
                content.push('\n');
            }
            content.push_str(&encode_entry(entry));
            content.push('\n');
        }
        for line in unreadable {
            content.push_str(&line.text);
            content.push('\n');
        }

        let temp = dir.join(format!(
            ".{}.{}.tmp",
            log.date.format("%Y-%m-%d"),
            Uuid::new_v4()
        ));
        let written = File::create(&temp).and_then(|mut file| {
            file.write_all(content.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&temp, &path)) {
            let _ = fs::remove_file(&temp);
            return Err(LedgerError::storage(
                &format!("rewrite {}", path.display()),
                e,
            ));
        }
        Ok(())
    }

    fn remove(&self, key: &DayKey) -> Result<bool, LedgerError> {
        let path = self.log_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(LedgerError::storage(&format!("remove {}", path.display()), e)),
        }
    }

    fn list_days(&self, category: Category) -> Result<Vec<NaiveDate>, LedgerError> {
        let dir = self.category_dir(category);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LedgerError::storage(&format!("list {}", dir.display()), e)),
        };

        let mut days = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LedgerError::storage(&format!("list {}", dir.display()), e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(date) = NaiveDate::parse_from_str(stem, "%Y-%m-%d") {
                days.push(date);
            }
        }

        days.sort_unstable_by(|a, b| b.cmp(a));
        Ok(days)
    }
}
