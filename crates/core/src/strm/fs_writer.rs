//! File system strm writer implementation.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::WriteError;
use super::traits::StrmWriter;
use super::types::{RemoveOutcome, WriteReceipt};
use crate::planner::STRM_EXTENSION;

/// Writes `.strm` files below a media root directory.
pub struct FsStrmWriter {
    media_root: PathBuf,
}

impl FsStrmWriter {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Joins a library-relative path onto the media root.
    ///
    /// Only plain relative components are accepted, at least a category
    /// directory plus a file name, and the file must end in `.strm`.
    fn absolute(&self, rel_path: &Path) -> Result<PathBuf, WriteError> {
        let mut depth = 0;
        for component in rel_path.components() {
            match component {
                Component::Normal(_) => depth += 1,
                _ => {
                    return Err(WriteError::invalid_path(
                        rel_path,
                        "only plain relative components are allowed",
                    ))
                }
            }
        }
        if depth < 2 {
            return Err(WriteError::invalid_path(
                rel_path,
                "path must include a category directory",
            ));
        }
        if rel_path.extension().and_then(|e| e.to_str()) != Some(STRM_EXTENSION) {
            return Err(WriteError::invalid_path(rel_path, "not a .strm file"));
        }
        Ok(self.media_root.join(rel_path))
    }

    /// Removes now-empty directories between `file` and its category root.
    async fn prune_empty_parents(&self, rel_path: &Path, file: &Path) {
        let Some(Component::Normal(category)) = rel_path.components().next() else {
            return;
        };
        let stop = self.media_root.join(category);

        let mut current = file.parent();
        while let Some(dir) = current {
            if dir == stop.as_path() || !dir.starts_with(&stop) {
                break;
            }
            // Fails on non-empty directories, which ends the walk.
            if fs::remove_dir(dir).await.is_err() {
                break;
            }
            debug!(path = %dir.display(), "Removed empty directory");
            current = dir.parent();
        }
    }
}

/// Single-line file content for a stream URL.
fn strm_content(url: &str) -> Result<String, WriteError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(WriteError::InvalidContent("stream URL is empty".to_string()));
    }
    if url.contains(['\n', '\r']) {
        return Err(WriteError::InvalidContent(
            "stream URL spans multiple lines".to_string(),
        ));
    }
    Ok(format!("{}\n", url))
}

async fn write_synced(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await
}

#[async_trait]
impl StrmWriter for FsStrmWriter {
    fn name(&self) -> &str {
        "fs"
    }

    async fn write(&self, rel_path: &Path, url: &str) -> Result<WriteReceipt, WriteError> {
        let destination = self.absolute(rel_path)?;
        let content = strm_content(url)?;

        let parent = destination
            .parent()
            .ok_or_else(|| WriteError::invalid_path(rel_path, "path has no parent"))?;
        fs::create_dir_all(parent).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                WriteError::PermissionDenied {
                    path: parent.to_path_buf(),
                }
            } else {
                WriteError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let replaced = fs::try_exists(&destination).await.unwrap_or(false);

        let file_name = destination
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let temp = parent.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        if let Err(e) = write_synced(&temp, content.as_bytes()).await {
            let _ = fs::remove_file(&temp).await;
            return Err(WriteError::from_io(&destination, e));
        }

        if let Err(e) = fs::rename(&temp, &destination).await {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                warn!(path = %temp.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(WriteError::from_io(&destination, e));
        }

        debug!(path = %rel_path.display(), replaced, "Wrote strm file");

        Ok(WriteReceipt {
            path: rel_path.to_path_buf(),
            bytes: content.len() as u64,
            replaced,
        })
    }

    async fn remove(&self, rel_path: &Path) -> Result<RemoveOutcome, WriteError> {
        let destination = self.absolute(rel_path)?;

        match fs::remove_file(&destination).await {
            Ok(()) => {
                debug!(path = %rel_path.display(), "Removed strm file");
                self.prune_empty_parents(rel_path, &destination).await;
                Ok(RemoveOutcome::Removed)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RemoveOutcome::Missing),
            Err(e) => Err(WriteError::from_io(&destination, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parents_and_content() {
        let temp = TempDir::new().unwrap();
        let writer = FsStrmWriter::new(temp.path());
        let rel = Path::new("tv/Foo/Season 01/Foo - S01E03.strm");

        let receipt = writer.write(rel, "  https://cdn/foo.mkv ").await.unwrap();

        assert_eq!(receipt.path, rel);
        assert!(!receipt.replaced);
        assert_eq!(receipt.bytes, "https://cdn/foo.mkv\n".len() as u64);
        let content = fs::read_to_string(temp.path().join(rel)).await.unwrap();
        assert_eq!(content, "https://cdn/foo.mkv\n");
    }

    #[tokio::test]
    async fn test_write_replaces_and_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let writer = FsStrmWriter::new(temp.path());
        let rel = Path::new("movies/Arrival/Arrival.strm");

        writer.write(rel, "https://cdn/old").await.unwrap();
        let receipt = writer.write(rel, "https://cdn/new").await.unwrap();

        assert!(receipt.replaced);
        let dir = temp.path().join("movies/Arrival");
        let mut entries = fs::read_dir(&dir).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["Arrival.strm".to_string()]);
        let content = fs::read_to_string(dir.join("Arrival.strm")).await.unwrap();
        assert_eq!(content, "https://cdn/new\n");
    }

    #[tokio::test]
    async fn test_write_rejects_bad_paths() {
        let temp = TempDir::new().unwrap();
        let writer = FsStrmWriter::new(temp.path());

        for bad in ["../escape.strm", "/etc/passwd.strm", "Arrival.strm", "movies/A/A.txt"] {
            let result = writer.write(Path::new(bad), "https://cdn/x").await;
            assert!(
                matches!(result, Err(WriteError::InvalidPath { .. })),
                "expected InvalidPath for {}",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_write_rejects_multiline_url() {
        let temp = TempDir::new().unwrap();
        let writer = FsStrmWriter::new(temp.path());
        let result = writer
            .write(Path::new("movies/A/A.strm"), "https://a\nhttps://b")
            .await;
        assert!(matches!(result, Err(WriteError::InvalidContent(_))));
        assert!(!temp.path().join("movies/A/A.strm").exists());
    }

    #[tokio::test]
    async fn test_write_fails_when_parent_is_a_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("movies"), "not a dir").await.unwrap();
        let writer = FsStrmWriter::new(temp.path());

        let result = writer.write(Path::new("movies/A/A.strm"), "https://cdn/a").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove_prunes_empty_dirs() {
        let temp = TempDir::new().unwrap();
        let writer = FsStrmWriter::new(temp.path());
        let e1 = Path::new("tv/Foo/Season 01/Foo - S01E01.strm");
        let e2 = Path::new("tv/Foo/Season 01/Foo - S01E02.strm");
        writer.write(e1, "https://cdn/1").await.unwrap();
        writer.write(e2, "https://cdn/2").await.unwrap();

        assert_eq!(writer.remove(e1).await.unwrap(), RemoveOutcome::Removed);
        assert!(temp.path().join("tv/Foo/Season 01").exists());

        assert_eq!(writer.remove(e2).await.unwrap(), RemoveOutcome::Removed);
        assert!(!temp.path().join("tv/Foo").exists());
        assert!(temp.path().join("tv").exists());
    }

    #[tokio::test]
    async fn test_remove_missing() {
        let temp = TempDir::new().unwrap();
        let writer = FsStrmWriter::new(temp.path());
        let outcome = writer
            .remove(Path::new("movies/Nope/Nope.strm"))
            .await
            .unwrap();
        assert_eq!(outcome, RemoveOutcome::Missing);
    }
}
