use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
#[allow(unused_imports)]
use utoipa::{OpenApi, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    message: String,
}

/// Public health check endpoint
///
/// Returns status "ok" if the service is running
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Server is healthy"),
    ),
    tag = "health"
)]
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            message: "Server is running".to_string(),
        }),
    )
}

pub fn routes() -> Router {
    Router::new().route("/api/health", get(health_check))
}
