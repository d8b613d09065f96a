use utoipa::OpenApi;

/// API documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Subsidy Notifications API",
        version = "0.1.0",
        description = "Notification center for the internship subsidy administration panel"
    ),
    paths(
        crate::routes::health::health_check,
        crate::notification::controller::get_notifications,
        crate::notification::controller::create_notification,
        crate::notification::controller::mark_notification_read,
        crate::notification::controller::mark_all_notifications_read,
        crate::notification::controller::delete_notification,
        crate::notification::controller::clear_notifications,
        crate::notification::controller::toggle_panel,
        crate::notification::controller::close_panel,
        crate::notification::controller::record_receipt_decision,
    ),
    components(
        schemas(
            crate::routes::health::HealthResponse,
            crate::controller::ErrorResponse,
            crate::notification::model::NotificationType,
            crate::notification::model::NewNotification,
            crate::notification::model::Notification,
            crate::notification::panel::NotificationView,
            crate::notification::panel::NotificationCenterView,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "notifications", description = "Notification center"),
        (name = "receipts", description = "Receipt review decisions")
    )
)]
pub struct ApiDoc;
