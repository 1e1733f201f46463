//! Listing of recently written `.strm` files.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::error::WriteError;
use super::types::StrmFileInfo;
use crate::media::Category;
use crate::planner::STRM_EXTENSION;

/// List `.strm` files under the media root, newest first by modification time.
///
/// With `category` set only that partition is scanned. Hidden files (including
/// in-flight temp files) are skipped. A missing partition yields no entries.
pub async fn recent_strm_files(
    media_root: &Path,
    category: Option<Category>,
    limit: usize,
) -> Result<Vec<StrmFileInfo>, WriteError> {
    let categories: Vec<Category> = match category {
        Some(c) => vec![c],
        None => Category::ALL.to_vec(),
    };

    let mut found = Vec::new();
    for category in categories {
        let root = media_root.join(category.dir_name());
        collect(media_root, &root, category, &mut found).await?;
    }

    found.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
    found.truncate(limit);
    Ok(found)
}

async fn collect(
    media_root: &Path,
    root: &Path,
    category: Category,
    found: &mut Vec<StrmFileInfo>,
) -> Result<(), WriteError> {
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(WriteError::from_io(&dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| WriteError::from_io(&dir, e))?
        {
            let path = entry.path();
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| WriteError::from_io(&path, e))?;

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(STRM_EXTENSION)
            {
                let metadata = entry
                    .metadata()
                    .await
                    .map_err(|e| WriteError::from_io(&path, e))?;
                let modified: DateTime<Utc> = metadata
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .unwrap_or_else(|_| Utc::now());
                found.push(StrmFileInfo {
                    path: relative_display(media_root, &path),
                    category,
                    modified,
                });
            }
        }
    }

    Ok(())
}

fn relative_display(media_root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(media_root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strm::{FsStrmWriter, StrmWriter};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    async fn touch(root: &Path, rel: &str, age_secs: u64) {
        let writer = FsStrmWriter::new(root);
        writer.write(Path::new(rel), "https://cdn/x").await.unwrap();
        let file = std::fs::File::options()
            .write(true)
            .open(root.join(rel))
            .unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
    }

    #[tokio::test]
    async fn test_recent_orders_newest_first() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "movies/Old/Old.strm", 300).await;
        touch(temp.path(), "tv/Foo/Season 01/Foo - S01E01.strm", 100).await;
        touch(temp.path(), "movies/New/New.strm", 10).await;

        let files = recent_strm_files(temp.path(), None, 10).await.unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "movies/New/New.strm",
                "tv/Foo/Season 01/Foo - S01E01.strm",
                "movies/Old/Old.strm",
            ]
        );
        assert_eq!(files[1].category, Category::Episode);
    }

    #[tokio::test]
    async fn test_recent_filters_and_limits() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "movies/A/A.strm", 30).await;
        touch(temp.path(), "movies/B/B.strm", 20).await;
        touch(temp.path(), "tv/Foo/Season 01/Foo - S01E01.strm", 10).await;
        std::fs::write(temp.path().join("movies/A/poster.jpg"), b"x").unwrap();

        let files = recent_strm_files(temp.path(), Some(Category::Movie), 1)
            .await
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "movies/B/B.strm");
    }

    #[tokio::test]
    async fn test_recent_empty_library() {
        let temp = TempDir::new().unwrap();
        let files = recent_strm_files(temp.path(), None, 10).await.unwrap();
        assert!(files.is_empty());
    }
}
