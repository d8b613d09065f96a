use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::notification::model::{Notification, NotificationType};
use crate::notification::store::NotificationStore;

const BADGE_LIMIT: usize = 9;

/// User gestures on the notification panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelIntent {
    Toggle,
    Close,
    MarkRead(String),
    MarkAllRead,
    Remove(String),
    ClearAll,
}

/// Open/closed state of the panel. Opening it with unread notifications
/// marks them all read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPanel {
    is_open: bool,
}

impl NotificationPanel {
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub async fn dispatch(&mut self, store: &mut NotificationStore, intent: PanelIntent) {
        match intent {
            PanelIntent::Toggle => {
                self.is_open = !self.is_open;
                if self.is_open && store.unread_count() > 0 {
                    store.mark_all_as_read().await;
                }
            }
            PanelIntent::Close => self.is_open = false,
            PanelIntent::MarkRead(id) => store.mark_as_read(&id).await,
            PanelIntent::MarkAllRead => store.mark_all_as_read().await,
            PanelIntent::Remove(id) => store.remove(&id).await,
            PanelIntent::ClearAll => store.clear_all().await,
        }
    }
}

/// One rendered row of the panel.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    pub icon: String,
    pub title: Option<String>,
    pub message: String,
    pub time: String,
    pub is_read: bool,
}

/// Everything a client needs to draw the bell and the panel.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCenterView {
    pub is_open: bool,
    pub unread_count: usize,
    pub badge: Option<String>,
    pub notifications: Vec<NotificationView>,
}

impl NotificationCenterView {
    pub fn render(panel: &NotificationPanel, store: &NotificationStore, now: DateTime<Utc>) -> Self {
        Self {
            is_open: panel.is_open(),
            unread_count: store.unread_count(),
            badge: badge_label(store.unread_count()),
            notifications: store
                .notifications()
                .iter()
                .map(|n| NotificationView::render(n, now))
                .collect(),
        }
    }
}

impl NotificationView {
    pub fn render(notification: &Notification, now: DateTime<Utc>) -> Self {
        Self {
            id: notification.id.clone(),
            icon: icon_for(notification.notification_type).to_string(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            time: format_timestamp(notification.timestamp, now),
            is_read: notification.is_read,
        }
    }
}

pub fn icon_for(notification_type: NotificationType) -> &'static str {
    match notification_type {
        NotificationType::Success => "check-circle",
        NotificationType::Error => "x-circle",
        NotificationType::Warning => "alert-circle",
        NotificationType::Info => "info",
    }
}

/// Text for the unread badge; `None` hides it.
pub fn badge_label(unread: usize) -> Option<String> {
    match unread {
        0 => None,
        n if n > BADGE_LIMIT => Some(format!("{}+", BADGE_LIMIT)),
        n => Some(n.to_string()),
    }
}

/// Relative label: "Today HH:MM" within a day, "Yesterday HH:MM" within two,
/// otherwise the full date.
pub fn format_timestamp(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(timestamp);
    if age < Duration::hours(24) {
        timestamp.format("Today %H:%M").to_string()
    } else if age < Duration::hours(48) {
        timestamp.format("Yesterday %H:%M").to_string()
    } else {
        timestamp.format("%-d %B %Y %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::model::NewNotification;
    use crate::notification::repository::NotificationRepository;
    use crate::notification::sound::Silent;
    use crate::notification::store::event_channel;
    use crate::storage::MemoryStorage;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn store() -> NotificationStore {
        NotificationStore::new(
            NotificationRepository::new(Arc::new(MemoryStorage::new())),
            event_channel(),
            Arc::new(Silent),
        )
    }

    #[tokio::test]
    async fn test_opening_marks_all_read() {
        let mut store = store();
        store
            .add(NewNotification::new(NotificationType::Info, "a"))
            .await;
        store
            .add(NewNotification::new(NotificationType::Error, "b"))
            .await;
        let mut panel = NotificationPanel::default();

        panel.dispatch(&mut store, PanelIntent::Toggle).await;
        assert!(panel.is_open());
        assert_eq!(store.unread_count(), 0);

        // Closing leaves read state alone
        panel.dispatch(&mut store, PanelIntent::Toggle).await;
        assert!(!panel.is_open());
        assert!(store.notifications().iter().all(|n| n.is_read));
    }

    #[tokio::test]
    async fn test_closing_does_not_mark_read() {
        let mut store = store();
        let mut panel = NotificationPanel::default();
        panel.dispatch(&mut store, PanelIntent::Toggle).await;

        store
            .add(NewNotification::new(NotificationType::Info, "arrived while open"))
            .await;
        panel.dispatch(&mut store, PanelIntent::Close).await;

        assert!(!panel.is_open());
        assert_eq!(store.unread_count(), 1);
    }

    #[tokio::test]
    async fn test_intents_map_to_store_operations() {
        let mut store = store();
        let mut panel = NotificationPanel::default();
        let a = store
            .add(NewNotification::new(NotificationType::Info, "a"))
            .await;
        let b = store
            .add(NewNotification::new(NotificationType::Info, "b"))
            .await;

        panel
            .dispatch(&mut store, PanelIntent::MarkRead(a.id.clone()))
            .await;
        assert_eq!(store.unread_count(), 1);

        panel.dispatch(&mut store, PanelIntent::Remove(b.id)).await;
        assert_eq!(store.notifications().len(), 1);
        assert_eq!(store.unread_count(), 0);

        // Double remove is harmless
        panel.dispatch(&mut store, PanelIntent::Remove(a.id.clone())).await;
        panel.dispatch(&mut store, PanelIntent::Remove(a.id)).await;
        assert!(store.notifications().is_empty());

        store
            .add(NewNotification::new(NotificationType::Info, "c"))
            .await;
        panel.dispatch(&mut store, PanelIntent::MarkAllRead).await;
        assert_eq!(store.unread_count(), 0);

        panel.dispatch(&mut store, PanelIntent::ClearAll).await;
        assert!(store.notifications().is_empty());
        assert!(!panel.is_open());
    }

    #[test]
    fn test_badge_label() {
        assert_eq!(badge_label(0), None);
        assert_eq!(badge_label(1).as_deref(), Some("1"));
        assert_eq!(badge_label(9).as_deref(), Some("9"));
        assert_eq!(badge_label(10).as_deref(), Some("9+"));
        assert_eq!(badge_label(250).as_deref(), Some("9+"));
    }

    #[test]
    fn test_format_timestamp_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 15, 0, 0).unwrap();

        let recent = Utc.with_ymd_and_hms(2024, 5, 10, 8, 5, 0).unwrap();
        assert_eq!(format_timestamp(recent, now), "Today 08:05");

        let yesterday = Utc.with_ymd_and_hms(2024, 5, 9, 9, 30, 0).unwrap();
        assert_eq!(format_timestamp(yesterday, now), "Yesterday 09:30");

        let older = Utc.with_ymd_and_hms(2024, 5, 2, 7, 45, 0).unwrap();
        assert_eq!(format_timestamp(older, now), "2 May 2024 07:45");
    }

    #[tokio::test]
    async fn test_render_center_view() {
        let mut store = store();
        store
            .add(NewNotification::new(NotificationType::Warning, "check").with_title("Heads up"))
            .await;
        let panel = NotificationPanel::default();

        let view = NotificationCenterView::render(&panel, &store, Utc::now());
        assert!(!view.is_open);
        assert_eq!(view.unread_count, 1);
        assert_eq!(view.badge.as_deref(), Some("1"));
        assert_eq!(view.notifications[0].icon, "alert-circle");
        assert_eq!(view.notifications[0].title.as_deref(), Some("Heads up"));
        assert!(view.notifications[0].time.starts_with("Today "));
    }
}
