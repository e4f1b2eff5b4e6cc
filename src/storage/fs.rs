//! Filesystem-backed image store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{ImageStore, check_reference, reference_taken};
use crate::error::PuzzleError;

/// Stores images as files in one flat directory.
///
/// The directory is created on first write if it does not exist.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    /// Creates a store rooted at `root`. No I/O happens until first use.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the directory images are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, reference: &str) -> Result<PathBuf, PuzzleError> {
        check_reference(reference)?;
        Ok(self.root.join(reference))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, reference: &str, bytes: &[u8]) -> Result<String, PuzzleError> {
        let path = self.path_for(reference)?;
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            PuzzleError::Storage(format!(
                "failed to create upload directory {}: {e}",
                self.root.display()
            ))
        })?;
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(reference_taken(reference)),
            Err(e) => {
                return Err(PuzzleError::Storage(format!(
                    "failed to save image {reference}: {e}"
                )));
            }
        };
        let written = match file.write_all(bytes).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %cleanup, "failed to remove partial image");
            }
            return Err(PuzzleError::Storage(format!(
                "failed to save image {reference}: {e}"
            )));
        }
        tracing::debug!(path = %path.display(), size = bytes.len(), "image saved");
        Ok(reference.to_string())
    }

    async fn delete(&self, reference: &str) -> Result<(), PuzzleError> {
        let path = self.path_for(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(PuzzleError::NotFound(format!("image {reference}")))
            }
            Err(e) => Err(PuzzleError::Storage(format!(
                "failed to delete image {reference}: {e}"
            ))),
        }
    }

    async fn exists(&self, reference: &str) -> Result<bool, PuzzleError> {
        let path = self.path_for(reference)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| PuzzleError::Storage(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FsImageStore) {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let store = FsImageStore::new(dir.path().join("uploads"));
        (dir, store)
    }

    #[tokio::test]
    async fn save_creates_missing_directory() {
        let (_dir, store) = temp_store();
        assert!(!store.root().exists());

        let saved = store.save("1_cat.png", b"bytes").await;
        assert_eq!(saved.ok().as_deref(), Some("1_cat.png"));
        assert!(store.root().join("1_cat.png").is_file());
        assert!(matches!(store.exists("1_cat.png").await, Ok(true)));
    }

    #[tokio::test]
    async fn save_never_replaces_existing_file() {
        let (_dir, store) = temp_store();
        let _ = store.save("1_cat.png", b"first").await;

        let second = store.save("1_cat.png", b"second").await;
        assert!(matches!(second, Err(PuzzleError::Conflict(_))));
        let Ok(bytes) = std::fs::read(store.root().join("1_cat.png")) else {
            panic!("read back");
        };
        assert_eq!(bytes, b"first");
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let (_dir, store) = temp_store();
        let _ = store.save("1_cat.png", b"bytes").await;

        assert!(store.delete("1_cat.png").await.is_ok());
        assert!(matches!(store.exists("1_cat.png").await, Ok(false)));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (_dir, store) = temp_store();
        let result = store.delete("nope.png").await;
        assert!(matches!(result, Err(PuzzleError::NotFound(_))));
    }

    #[tokio::test]
    async fn save_rejects_traversal() {
        let (_dir, store) = temp_store();
        let result = store.save("../escape.png", b"x").await;
        assert!(matches!(result, Err(PuzzleError::Validation(_))));
    }
}
