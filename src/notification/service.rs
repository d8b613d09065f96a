use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::info;

use crate::notification::model::{
    NewNotification, Notification, NotificationError, NotificationSnapshot,
};
use crate::notification::panel::{NotificationCenterView, NotificationPanel, PanelIntent};
use crate::notification::producer::ReceiptDecision;
use crate::notification::store::{NotificationStore, StoreEvent};

struct Session {
    store: NotificationStore,
    panel: NotificationPanel,
}

/// Shared handle to the session's notification store and panel. Cloning is
/// cheap; every clone sees the same state, and each call runs to completion
/// before the next one starts.
#[derive(Clone)]
pub struct NotificationService {
    session: Arc<Mutex<Session>>,
    events: broadcast::Sender<StoreEvent>,
}

impl NotificationService {
    pub fn new(store: NotificationStore, events: broadcast::Sender<StoreEvent>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session {
                store,
                panel: NotificationPanel::default(),
            })),
            events,
        }
    }

    /// Bootstrap from durable storage; later calls do nothing.
    pub async fn initialize(&self) {
        self.session.lock().await.store.initialize().await;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub async fn create_notification(
        &self,
        input: NewNotification,
    ) -> Result<Notification, NotificationError> {
        if input.message.trim().is_empty() {
            return Err(NotificationError::EmptyMessage);
        }
        Ok(self.session.lock().await.store.add(input).await)
    }

    /// Record the notification for a reviewer's decision on a receipt.
    pub async fn record_receipt_decision(
        &self,
        receipt_id: &str,
        decision: &ReceiptDecision,
    ) -> Result<Notification, NotificationError> {
        let input = decision.to_notification(receipt_id)?;
        info!("Receipt {} decision: {:?}", receipt_id, decision);
        self.create_notification(input).await
    }

    /// Apply a panel gesture and return the updated view.
    pub async fn dispatch(&self, intent: PanelIntent) -> NotificationCenterView {
        let mut session = self.session.lock().await;
        let Session { store, panel } = &mut *session;
        panel.dispatch(store, intent).await;
        NotificationCenterView::render(panel, store, Utc::now())
    }

    pub async fn snapshot(&self) -> NotificationSnapshot {
        self.session.lock().await.store.snapshot()
    }

    pub async fn view(&self) -> NotificationCenterView {
        let session = self.session.lock().await;
        NotificationCenterView::render(&session.panel, &session.store, Utc::now())
    }
}
