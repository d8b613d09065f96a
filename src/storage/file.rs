use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::{check_quota, KeyValueStorage, StorageError};

/// Directory-backed storage: one file per key under the origin directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    /// Open (and create if needed) the storage directory.
    pub async fn open(dir: impl AsRef<Path>, quota: Option<usize>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        info!("Using file storage at {}", dir.display());
        Ok(Self { dir, quota })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            || key.starts_with('.')
        {
            return Err(StorageError::Backend(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(value, self.quota)?;
        let path = self.path_for(key)?;

        // Write next to the target, then rename over it
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path(), None).await.unwrap();

        assert!(storage.get("notifications").await.unwrap().is_none());

        storage.set("notifications", "[]").await.unwrap();
        assert_eq!(
            storage.get("notifications").await.unwrap().as_deref(),
            Some("[]")
        );
        assert!(dir.path().join("notifications.json").exists());

        storage.remove("notifications").await.unwrap();
        assert!(storage.get("notifications").await.unwrap().is_none());

        // Removing twice is fine
        storage.remove("notifications").await.unwrap();
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::open(dir.path(), None).await.unwrap();
            storage.set("notifications", r#"[{"a":1}]"#).await.unwrap();
        }

        let reopened = FileStorage::open(dir.path(), None).await.unwrap();
        assert_eq!(
            reopened.get("notifications").await.unwrap().as_deref(),
            Some(r#"[{"a":1}]"#)
        );
    }

    #[tokio::test]
    async fn test_quota_rejects_large_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path(), Some(4)).await.unwrap();

        storage.set("k", "1234").await.unwrap();
        let err = storage.set("k", "12345").await.unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { size: 5, quota: 4 }));

        // Previous value is left in place
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path(), None).await.unwrap();

        assert!(storage.set("../escape", "x").await.is_err());
        assert!(storage.get("").await.is_err());
    }
}
