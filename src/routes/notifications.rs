use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::notification::controller::{
    clear_notifications, close_panel, create_notification, delete_notification,
    get_notifications, mark_all_notifications_read, mark_notification_read,
    record_receipt_decision, toggle_panel,
};
use crate::notification::service::NotificationService;
use crate::websocket::notifications::ws_handler;

/// Create a router for notification and receipt routes
pub fn routes(service: NotificationService) -> Router {
    Router::new()
        .route(
            "/api/notifications",
            get(get_notifications)
                .post(create_notification)
                .delete(clear_notifications),
        )
        // Static segments are matched before `:id`
        .route("/api/notifications/read-all", post(mark_all_notifications_read))
        .route("/api/notifications/panel/toggle", post(toggle_panel))
        .route("/api/notifications/panel/close", post(close_panel))
        .route("/api/notifications/ws", get(ws_handler))
        .route("/api/notifications/:id", delete(delete_notification))
        .route("/api/notifications/:id/read", post(mark_notification_read))
        .route("/api/receipts/:id/decision", post(record_receipt_decision))
        .with_state(service)
}
