use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::notification::model::{NewNotification, Notification, NotificationSnapshot};
use crate::notification::repository::NotificationRepository;
use crate::notification::sound::{AlertSound, Chime};

pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Published to subscribers after state changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "lowercase")]
pub enum StoreEvent {
    Snapshot(NotificationSnapshot),
    Chime(Chime),
}

/// Create the channel the store publishes on.
pub fn event_channel() -> broadcast::Sender<StoreEvent> {
    broadcast::channel(EVENT_CHANNEL_CAPACITY).0
}

/// Owner of the notification list and its unread count.
///
/// Every mutation computes the next state, persists it through the
/// repository, then publishes a snapshot. Persistence failures are logged and
/// never surface to the caller; the in-memory list stays authoritative.
pub struct NotificationStore {
    notifications: Vec<Notification>,
    unread_count: usize,
    repository: NotificationRepository,
    events: broadcast::Sender<StoreEvent>,
    sound: Arc<dyn AlertSound>,
    initialized: bool,
    last_id: i64,
}

impl NotificationStore {
    pub fn new(
        repository: NotificationRepository,
        events: broadcast::Sender<StoreEvent>,
        sound: Arc<dyn AlertSound>,
    ) -> Self {
        Self {
            notifications: Vec::new(),
            unread_count: 0,
            repository,
            events,
            sound,
            initialized: false,
            last_id: 0,
        }
    }

    /// Load the persisted list. Only the first call has an effect, and an
    /// empty store leaves the state untouched.
    pub async fn initialize(&mut self) {
        if self.initialized {
            debug!("Notification store already initialized");
            return;
        }
        self.initialized = true;

        let stored = self.repository.load().await;
        if stored.is_empty() {
            return;
        }

        self.last_id = stored
            .iter()
            .filter_map(|n| n.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0)
            .max(self.last_id);
        self.notifications = stored;
        self.unread_count = self.count_unread();

        info!(
            "Restored {} notifications ({} unread)",
            self.notifications.len(),
            self.unread_count
        );
        self.publish();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn snapshot(&self) -> NotificationSnapshot {
        NotificationSnapshot {
            notifications: self.notifications.clone(),
            unread_count: self.unread_count,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Record a new notification at the head of the list.
    pub async fn add(&mut self, input: NewNotification) -> Notification {
        let now = Utc::now().trunc_subsecs(3);
        let notification = Notification {
            id: self.next_id(now),
            message: input.message,
            notification_type: input.notification_type,
            title: input.title,
            is_read: false,
            timestamp: now,
        };

        self.notifications.insert(0, notification.clone());
        self.persist().await;
        self.unread_count += 1;
        debug_assert_eq!(self.unread_count, self.count_unread());

        info!(
            "Added {:?} notification {}",
            notification.notification_type, notification.id
        );
        self.publish();
        self.play_alert();

        notification
    }

    /// Mark one notification read. Unknown ids are ignored.
    pub async fn mark_as_read(&mut self, id: &str) {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => notification.is_read = true,
            None => debug!("mark_as_read: notification {} not found", id),
        }

        self.persist().await;
        self.unread_count = self.count_unread();
        self.publish();
    }

    pub async fn mark_all_as_read(&mut self) {
        for notification in &mut self.notifications {
            notification.is_read = true;
        }

        self.persist().await;
        self.unread_count = 0;
        self.publish();
    }

    /// Remove one notification. Unknown ids are ignored.
    pub async fn remove(&mut self, id: &str) {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        if self.notifications.len() == before {
            debug!("remove: notification {} not found", id);
        }

        self.persist().await;
        self.unread_count = self.count_unread();
        self.publish();
    }

    pub async fn clear_all(&mut self) {
        self.notifications.clear();
        self.repository.clear().await;
        self.unread_count = 0;

        info!("Cleared all notifications");
        self.publish();
    }

    fn count_unread(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }

    // Millisecond timestamp, bumped past anything already issued or listed.
    // Restored ids can sit at the top of the range, so bumping may run out.
    fn next_id(&mut self, now: DateTime<Utc>) -> String {
        let mut candidate = self
            .last_id
            .checked_add(1)
            .map(|next| next.max(now.timestamp_millis()));
        while let Some(value) = candidate {
            let id = value.to_string();
            if !self.notifications.iter().any(|n| n.id == id) {
                self.last_id = value;
                return id;
            }
            candidate = value.checked_add(1);
        }

        warn!("Numeric notification ids exhausted, issuing a random id");
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.notifications.iter().any(|n| n.id == id) {
                return id;
            }
        }
    }

    async fn persist(&self) {
        if let Err(e) = self.repository.save(&self.notifications).await {
            error!("Error saving notifications to storage: {}", e);
        }
    }

    fn publish(&self) {
        if self.events.send(StoreEvent::Snapshot(self.snapshot())).is_err() {
            debug!("No subscribers for notification snapshot");
        }
    }

    fn play_alert(&self) {
        let sound = Arc::clone(&self.sound);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = sound.play().await {
                        debug!("Notification sound could not be played: {}", e);
                    }
                });
            }
            Err(_) => debug!("No async runtime, skipping notification sound"),
        }
    }
}
