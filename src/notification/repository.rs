use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::notification::model::{Notification, NotificationError};
use crate::storage::KeyValueStorage;

/// Storage key holding the serialized notification list
pub const NOTIFICATIONS_KEY: &str = "notifications";

/// Durable mirror of the notification list. The blob is always overwritten
/// wholesale, never diffed.
#[derive(Clone)]
pub struct NotificationRepository {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl NotificationRepository {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            key: NOTIFICATIONS_KEY.to_string(),
        }
    }

    /// Read the stored list. Absent, unreadable or corrupt blobs yield an
    /// empty list.
    pub async fn load(&self) -> Vec<Notification> {
        let raw = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored notifications under '{}'", self.key);
                return Vec::new();
            }
            Err(e) => {
                error!("Error loading notifications from storage: {}", e);
                return Vec::new();
            }
        };

        let parsed: Vec<Notification> = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Discarding corrupt notification blob: {}", e);
                return Vec::new();
            }
        };

        // Keep ids unique; the first (newest) occurrence wins
        let mut seen = HashSet::with_capacity(parsed.len());
        let total = parsed.len();
        let notifications: Vec<Notification> = parsed
            .into_iter()
            .filter(|n| seen.insert(n.id.clone()))
            .collect();
        if notifications.len() != total {
            warn!(
                "Dropped {} notifications with duplicate ids",
                total - notifications.len()
            );
        }

        debug!("Loaded {} notifications", notifications.len());
        notifications
    }

    /// Serialize the full list and overwrite the stored blob.
    pub async fn save(&self, notifications: &[Notification]) -> Result<(), NotificationError> {
        let json = serde_json::to_string(notifications)?;
        self.storage.set(&self.key, &json).await?;
        debug!("Saved {} notifications", notifications.len());
        Ok(())
    }

    /// Remove the stored blob entirely.
    pub async fn clear(&self) {
        if let Err(e) = self.storage.remove(&self.key).await {
            error!("Error removing notifications from storage: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::model::NotificationType;
    use crate::storage::{MemoryStorage, MockKeyValueStorage, StorageError};
    use chrono::{TimeZone, Utc};

    fn sample(id: &str, is_read: bool) -> Notification {
        Notification {
            id: id.to_string(),
            message: format!("message {}", id),
            notification_type: NotificationType::Info,
            title: None,
            is_read,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_load_absent_key_is_empty() {
        let repo = NotificationRepository::new(Arc::new(MemoryStorage::new()));
        assert!(repo.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let repo = NotificationRepository::new(Arc::new(MemoryStorage::new()));
        let list = vec![sample("2", false), sample("1", true)];

        repo.save(&list).await.unwrap();
        assert_eq!(repo.load().await, list);
    }

    #[tokio::test]
    async fn test_save_of_loaded_list_is_byte_identical() {
        let storage = Arc::new(MemoryStorage::new());
        let stored = r#"[{"id":"1709294400000","message":"Dekont reddedildi","type":"error","title":"Red","isRead":false,"timestamp":"2024-03-01T12:00:00.000Z"},{"id":"1709290800000","message":"ok","type":"success","isRead":true,"timestamp":"2024-03-01T11:00:00.457Z"}]"#;
        storage.set(NOTIFICATIONS_KEY, stored).await.unwrap();

        let repo = NotificationRepository::new(storage.clone());
        let loaded = repo.load().await;
        repo.save(&loaded).await.unwrap();

        assert_eq!(
            storage.get(NOTIFICATIONS_KEY).await.unwrap().as_deref(),
            Some(stored)
        );
    }

    #[tokio::test]
    async fn test_corrupt_blob_loads_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(NOTIFICATIONS_KEY, "{not json").await.unwrap();

        let repo = NotificationRepository::new(storage);
        assert!(repo.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_dropped_on_load() {
        let storage = Arc::new(MemoryStorage::new());
        let repo = NotificationRepository::new(storage);
        repo.save(&[sample("1", false), sample("1", true), sample("2", false)])
            .await
            .unwrap();

        let loaded = repo.load().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "1");
        assert!(!loaded[0].is_read);
        assert_eq!(loaded[1].id, "2");
    }

    #[tokio::test]
    async fn test_storage_read_error_loads_empty() {
        let mut storage = MockKeyValueStorage::new();
        storage
            .expect_get()
            .returning(|_| Err(StorageError::Backend("unavailable".to_string())));

        let repo = NotificationRepository::new(Arc::new(storage));
        assert!(repo.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_reports_quota_error() {
        let repo = NotificationRepository::new(Arc::new(MemoryStorage::with_quota(10)));
        let err = repo.save(&[sample("1", false)]).await.unwrap_err();
        assert!(matches!(
            err,
            NotificationError::Storage(StorageError::QuotaExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_clear_removes_blob() {
        let storage = Arc::new(MemoryStorage::new());
        let repo = NotificationRepository::new(storage.clone());
        repo.save(&[sample("1", false)]).await.unwrap();

        repo.clear().await;
        assert!(storage.get(NOTIFICATIONS_KEY).await.unwrap().is_none());
        assert!(repo.load().await.is_empty());
    }
}
