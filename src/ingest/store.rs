use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::config;

/// Extensions the upload endpoint accepts. Excel files pass this filter but
/// are rejected later by the parser; the mismatch is long-standing observed
/// behavior that clients depend on for their error messaging.
const ALLOWED_EXTENSIONS: [&str; 3] = [".csv", ".xlsx", ".xls"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Lower-cased extension of a filename, dot included ("report.CSV" -> ".csv")
pub fn file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

pub fn is_allowed_file(filename: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&file_extension(filename).as_str())
}

/// Durable store for uploaded artifacts, scoped to one uploads directory.
/// Stored names combine the owning portfolio id with a fresh random token so
/// re-uploads never collide; the previous artifact is orphaned, not deleted.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config() -> Self {
        Self::new(&config::config().uploads.dir)
    }

    /// Write uploaded bytes under a collision-resistant name and return the
    /// stored path. A partially written file is removed before any error is
    /// surfaced; callers never observe an orphaned partial artifact.
    pub async fn store(
        &self,
        portfolio_id: Uuid,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let stored_name = format!("{}_{}{}", portfolio_id, Uuid::new_v4(), file_extension(filename));
        let path = self.root.join(stored_name);

        if let Err(e) = tokio::fs::write(&path, bytes).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(StoreError::Io(e));
        }

        Ok(path.to_string_lossy().into_owned())
    }

    /// Read a stored artifact back; `NotFound` when the path no longer exists
    pub async fn retrieve(&self, stored_path: &str) -> Result<Vec<u8>, StoreError> {
        match tokio::fs::read(stored_path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(stored_path.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Best-effort cleanup used when processing fails after the write
    pub async fn remove(&self, stored_path: &str) {
        let _ = tokio::fs::remove_file(stored_path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased_with_dot() {
        assert_eq!(file_extension("holdings.CSV"), ".csv");
        assert_eq!(file_extension("report.xlsx"), ".xlsx");
        assert_eq!(file_extension("noext"), "");
    }

    #[test]
    fn filename_filter_allows_csv_and_excel() {
        assert!(is_allowed_file("holdings.csv"));
        assert!(is_allowed_file("holdings.XLSX"));
        assert!(is_allowed_file("holdings.xls"));
        assert!(!is_allowed_file("holdings.txt"));
        assert!(!is_allowed_file("holdings"));
    }

    #[tokio::test]
    async fn store_and_retrieve_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let portfolio_id = Uuid::new_v4();

        let path = store
            .store(portfolio_id, "holdings.csv", b"Ticker\nAAPL\n")
            .await
            .unwrap();

        // Name carries the portfolio id and keeps the extension
        let name = Path::new(&path).file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(&portfolio_id.to_string()));
        assert!(name.ends_with(".csv"));

        let bytes = store.retrieve(&path).await.unwrap();
        assert_eq!(bytes, b"Ticker\nAAPL\n");
    }

    #[tokio::test]
    async fn reuploads_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let portfolio_id = Uuid::new_v4();

        let first = store.store(portfolio_id, "a.csv", b"1").await.unwrap();
        let second = store.store(portfolio_id, "a.csv", b"2").await.unwrap();
        assert_ne!(first, second);

        // The earlier artifact is orphaned, not deleted
        assert_eq!(store.retrieve(&first).await.unwrap(), b"1");
        assert_eq!(store.retrieve(&second).await.unwrap(), b"2");
    }

    #[tokio::test]
    async fn retrieve_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let missing = dir.path().join("gone.csv");
        assert!(matches!(
            store.retrieve(&missing.to_string_lossy()).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let path = store
            .store(Uuid::new_v4(), "a.csv", b"1")
            .await
            .unwrap();
        store.remove(&path).await;
        store.remove(&path).await;
        assert!(matches!(
            store.retrieve(&path).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
