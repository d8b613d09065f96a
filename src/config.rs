use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

use crate::notification::sound::DEFAULT_SOUND_SRC;

const DEFAULT_PORT: u16 = 9500;

/// Which durable backend holds the notification blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Redis { url: String, key_prefix: Option<String> },
    File { dir: PathBuf },
    Memory,
}

// App config collected from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageBackend,
    pub storage_quota_bytes: Option<usize>,
    pub sound_enabled: bool,
    pub sound_src: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. Redis wins over a storage
    /// directory; with neither, notifications live in memory only.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage = if let Some(url) = non_empty("REDIS_URL") {
            StorageBackend::Redis {
                url,
                key_prefix: non_empty("REDIS_KEY_PREFIX"),
            }
        } else if let Some(dir) = non_empty("STORAGE_DIR") {
            StorageBackend::File {
                dir: PathBuf::from(dir),
            }
        } else {
            StorageBackend::Memory
        };

        Self {
            storage,
            storage_quota_bytes: parse_var(&lookup, "STORAGE_QUOTA_BYTES"),
            sound_enabled: non_empty("NOTIFICATION_SOUND")
                .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "off" | "no"))
                .unwrap_or(true),
            sound_src: non_empty("NOTIFICATION_SOUND_SRC")
                .unwrap_or_else(|| DEFAULT_SOUND_SRC.to_string()),
            port: parse_var(&lookup, "PORT").unwrap_or(DEFAULT_PORT),
        }
    }
}

// Unset or malformed values read as None
fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}
