//! Removal of local artifacts once their archive is stored.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::error::ArchiveError;

/// Removes a file, treating an already-missing file as removed.
pub(crate) async fn remove_file(path: &Path) -> Result<(), ArchiveError> {
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Removed");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ArchiveError::Purge {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Removes everything inside `dir`, keeping `dir` itself.
pub(crate) async fn clear_dir(dir: &Path) -> Result<usize, ArchiveError> {
    let purge_err = |path: PathBuf, e: std::io::Error| ArchiveError::Purge { path, source: e };

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(purge_err(dir.to_path_buf(), e)),
    };

    let mut removed = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| purge_err(dir.to_path_buf(), e))?
    {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| purge_err(path.clone(), e))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&path)
                .await
                .map_err(|e| purge_err(path.clone(), e))?;
        } else {
            fs::remove_file(&path)
                .await
                .map_err(|e| purge_err(path.clone(), e))?;
        }
        removed += 1;
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clear_dir_keeps_directory() {
        let temp = TempDir::new().unwrap();
        let reports = temp.path().join("reports");
        std::fs::create_dir_all(reports.join("archive")).unwrap();
        std::fs::write(reports.join("a.txt"), "a").unwrap();
        std::fs::write(reports.join("archive").join("b.zip"), "b").unwrap();

        let removed = clear_dir(&reports).await.unwrap();
        assert_eq!(removed, 2);
        assert!(reports.is_dir());
        assert_eq!(std::fs::read_dir(&reports).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_clear_missing_dir() {
        let temp = TempDir::new().unwrap();
        assert_eq!(clear_dir(&temp.path().join("nope")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let temp = TempDir::new().unwrap();
        remove_file(&temp.path().join("gone.dat")).await.unwrap();
    }
}
