use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

use super::{check_quota, KeyValueStorage, StorageError};

const DEFAULT_KEY_PREFIX: &str = "subsidy";

/// Redis-backed storage, for deployments where several instances share one
/// origin.
#[derive(Debug, Clone)]
pub struct RedisStorage {
    client: Client,
    prefix: String,
    quota: Option<usize>,
}

impl RedisStorage {
    pub fn new(client: Client, prefix: Option<String>, quota: Option<usize>) -> Self {
        // Connection validation happens on first use
        let prefix = prefix.unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string());
        info!("Using Redis storage with key prefix '{}'", prefix);
        Self {
            client,
            prefix,
            quota,
        }
    }

    // Get the client
    pub fn get_client(&self) -> &Client {
        &self.client
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait]
impl KeyValueStorage for RedisStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut connection = self.client.get_multiplexed_async_connection().await?;
        let result: Option<String> = connection.get(self.namespaced(key)).await?;

        if result.is_some() {
            debug!("Storage hit for key: {}", key);
        } else {
            debug!("Storage miss for key: {}", key);
        }

        Ok(result)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(value, self.quota)?;
        self.get_client()
            .get_multiplexed_async_connection()
            .await?
            .set(self.namespaced(key), value)
            .await
            .map(|_: ()| ())
            .map_err(StorageError::from)
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.get_client()
            .get_multiplexed_async_connection()
            .await?
            .del(self.namespaced(key))
            .await
            .map(|_: ()| ())
            .map_err(StorageError::from)
    }
}
