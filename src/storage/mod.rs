pub mod file;
pub mod memory;
pub mod redis;

use async_trait::async_trait;

pub use self::file::FileStorage;
pub use self::memory::MemoryStorage;
pub use self::redis::RedisStorage;

// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Quota exceeded: {size} bytes requested, {quota} bytes allowed")]
    QuotaExceeded { size: usize, quota: usize },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Durable key-value slot shared by everything running in one origin.
///
/// Values are opaque strings; callers own the encoding. Writes overwrite the
/// previous value wholesale.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Reject a write that would not fit in `quota` bytes.
pub(crate) fn check_quota(value: &str, quota: Option<usize>) -> Result<(), StorageError> {
    match quota {
        Some(quota) if value.len() > quota => Err(StorageError::QuotaExceeded {
            size: value.len(),
            quota,
        }),
        _ => Ok(()),
    }
}
