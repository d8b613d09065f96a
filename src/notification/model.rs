use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::StorageError;

/// Kind of a notification. Only selects the icon shown next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Success,
    Error,
    Warning,
    Info,
}

/// Caller-supplied part of a notification; identity, read state and time are
/// assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewNotification {
    #[schema(example = "Receipt for intern Ayşe was approved")]
    pub message: String,

    #[serde(rename = "type")]
    pub notification_type: NotificationType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Receipt approved")]
    pub title: Option<String>,
}

impl NewNotification {
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            notification_type,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// One user-facing event record, as stored and as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub message: String,

    #[serde(rename = "type")]
    pub notification_type: NotificationType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub is_read: bool,

    #[serde(with = "iso_millis")]
    #[schema(value_type = String, example = "2024-05-02T09:30:00.000Z")]
    pub timestamp: DateTime<Utc>,
}

/// The list plus its derived unread count, published after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSnapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Notification message must not be empty")]
    EmptyMessage,

    #[error("A rejection needs a reason")]
    MissingReason,
}

/// Timestamps travel as `YYYY-MM-DDTHH:MM:SS.mmmZ`, the format browsers write.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
