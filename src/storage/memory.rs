use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{check_quota, KeyValueStorage, StorageError};

/// Process-local storage. Lost on restart; used when no durable backend is
/// configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Backend(format!("Memory storage poisoned: {}", e)))
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(value, self.quota)?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_basics() {
        let storage = MemoryStorage::new();
        assert!(storage.get("k").await.unwrap().is_none());

        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));

        storage.remove("k").await.unwrap();
        assert!(storage.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_storage_quota() {
        let storage = MemoryStorage::with_quota(2);
        assert!(storage.set("k", "ab").await.is_ok());
        assert!(matches!(
            storage.set("k", "abc").await,
            Err(StorageError::QuotaExceeded { .. })
        ));
    }
}
