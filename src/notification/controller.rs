use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::error;

use crate::controller::ErrorResponse;
#[allow(unused_imports)]
use crate::notification::model::{NewNotification, Notification, NotificationError};
#[allow(unused_imports)]
use crate::notification::panel::{NotificationCenterView, PanelIntent};
use crate::notification::producer::ReceiptDecision;
use crate::notification::service::NotificationService;

// Helper function to convert NotificationError to HTTP response
fn notification_error_to_response(err: NotificationError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, error_message, code) = match err {
        NotificationError::EmptyMessage => (
            StatusCode::BAD_REQUEST,
            "Notification message must not be empty",
            "EMPTY_MESSAGE",
        ),
        NotificationError::MissingReason => (
            StatusCode::BAD_REQUEST,
            "A rejection needs a reason",
            "MISSING_REASON",
        ),
        NotificationError::Storage(e) => {
            error!("Storage error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Storage error",
                "STORAGE_ERROR",
            )
        }
        NotificationError::Serialization(e) => {
            error!("Serialization error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process notification data",
                "SERIALIZATION_ERROR",
            )
        }
    };

    (status, Json(ErrorResponse::new(error_message, code)))
}

/// Get the notification center
///
/// Returns the list (newest first), the unread count, the badge label and
/// whether the panel is open.
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    responses(
        (status = 200, description = "Current notification center", body = NotificationCenterView)
    )
)]
pub async fn get_notifications(State(service): State<NotificationService>) -> impl IntoResponse {
    Json(service.view().await)
}

/// Add a notification
#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "notifications",
    request_body = NewNotification,
    responses(
        (status = 201, description = "Notification recorded", body = Notification),
        (status = 400, description = "Empty message", body = ErrorResponse)
    )
)]
pub async fn create_notification(
    State(service): State<NotificationService>,
    Json(input): Json<NewNotification>,
) -> impl IntoResponse {
    match service.create_notification(input).await {
        Ok(notification) => (StatusCode::CREATED, Json(notification)).into_response(),
        Err(e) => notification_error_to_response(e).into_response(),
    }
}

/// Mark one notification as read
///
/// Unknown ids leave the state unchanged.
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    tag = "notifications",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Updated notification center", body = NotificationCenterView)
    )
)]
pub async fn mark_notification_read(
    State(service): State<NotificationService>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    Json(service.dispatch(PanelIntent::MarkRead(id)).await)
}

/// Mark every notification as read
#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = "notifications",
    responses(
        (status = 200, description = "Updated notification center", body = NotificationCenterView)
    )
)]
pub async fn mark_all_notifications_read(
    State(service): State<NotificationService>,
) -> impl IntoResponse {
    Json(service.dispatch(PanelIntent::MarkAllRead).await)
}

/// Remove one notification
///
/// Unknown ids leave the state unchanged.
#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    tag = "notifications",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Updated notification center", body = NotificationCenterView)
    )
)]
pub async fn delete_notification(
    State(service): State<NotificationService>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    Json(service.dispatch(PanelIntent::Remove(id)).await)
}

/// Remove all notifications
#[utoipa::path(
    delete,
    path = "/api/notifications",
    tag = "notifications",
    responses(
        (status = 200, description = "Empty notification center", body = NotificationCenterView)
    )
)]
pub async fn clear_notifications(State(service): State<NotificationService>) -> impl IntoResponse {
    Json(service.dispatch(PanelIntent::ClearAll).await)
}

/// Open or close the panel
///
/// Opening the panel while there are unread notifications marks them read.
#[utoipa::path(
    post,
    path = "/api/notifications/panel/toggle",
    tag = "notifications",
    responses(
        (status = 200, description = "Updated notification center", body = NotificationCenterView)
    )
)]
pub async fn toggle_panel(State(service): State<NotificationService>) -> impl IntoResponse {
    Json(service.dispatch(PanelIntent::Toggle).await)
}

/// Close the panel
#[utoipa::path(
    post,
    path = "/api/notifications/panel/close",
    tag = "notifications",
    responses(
        (status = 200, description = "Updated notification center", body = NotificationCenterView)
    )
)]
pub async fn close_panel(State(service): State<NotificationService>) -> impl IntoResponse {
    Json(service.dispatch(PanelIntent::Close).await)
}

/// Record a decision on a receipt
///
/// Body: `{"decision":"approved"}`, `{"decision":"rejected","reason":"...","note":"..."}`
/// or `{"decision":"note_added","note":"..."}`.
#[utoipa::path(
    post,
    path = "/api/receipts/{id}/decision",
    tag = "receipts",
    params(("id" = String, Path, description = "Receipt id")),
    responses(
        (status = 201, description = "Notification recorded", body = Notification),
        (status = 400, description = "Missing reason or empty note", body = ErrorResponse)
    )
)]
pub async fn record_receipt_decision(
    State(service): State<NotificationService>,
    Path(receipt_id): Path<String>,
    Json(decision): Json<ReceiptDecision>,
) -> impl IntoResponse {
    match service.record_receipt_decision(&receipt_id, &decision).await {
        Ok(notification) => (StatusCode::CREATED, Json(notification)).into_response(),
        Err(e) => notification_error_to_response(e).into_response(),
    }
}
