mod api_doc;
mod config;
mod controller;
mod notification;
mod routes;
mod storage;
mod websocket;

use axum::{routing::get, Router};
use dotenv::dotenv;
use redis::Client;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::config::{AppConfig, StorageBackend};
use crate::notification::repository::NotificationRepository;
use crate::notification::service::NotificationService;
use crate::notification::sound::{AlertSound, BroadcastChime, Silent};
use crate::notification::store::{event_channel, NotificationStore};
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage, RedisStorage};

async fn open_storage(
    config: &AppConfig,
) -> Result<Arc<dyn KeyValueStorage>, Box<dyn std::error::Error>> {
    let storage: Arc<dyn KeyValueStorage> = match &config.storage {
        StorageBackend::Redis { url, key_prefix } => {
            info!("Initializing Redis storage with URL: {}", url);
            let client = Client::open(url.clone())?;
            Arc::new(RedisStorage::new(
                client,
                key_prefix.clone(),
                config.storage_quota_bytes,
            ))
        }
        StorageBackend::File { dir } => {
            Arc::new(FileStorage::open(dir, config.storage_quota_bytes).await?)
        }
        StorageBackend::Memory => {
            info!("No storage configured, notifications will not survive a restart");
            Arc::new(match config.storage_quota_bytes {
                Some(quota) => MemoryStorage::with_quota(quota),
                None => MemoryStorage::new(),
            })
        }
    };
    Ok(storage)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    tracing_subscriber::fmt::init();

    // Load .env file if it exists
    dotenv().ok();

    let config = AppConfig::from_env();
    let storage = open_storage(&config).await?;

    let events = event_channel();
    let sound: Arc<dyn AlertSound> = if config.sound_enabled {
        Arc::new(BroadcastChime::new(events.clone(), config.sound_src.clone()))
    } else {
        info!("Notification sound disabled");
        Arc::new(Silent)
    };

    let store = NotificationStore::new(NotificationRepository::new(storage), events.clone(), sound);
    let notification_service = NotificationService::new(store, events);

    // Load persisted notifications once, before anything is served
    notification_service.initialize().await;

    // Build the router
    let app = Router::new()
        // API documentation
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Health routes
        .merge(routes::health::routes())
        // Notification routes
        .merge(routes::notifications::routes(notification_service))
        // Add welcome route
        .route(
            "/",
            get(|| async { "Welcome to the Subsidy Notifications API" }),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Try different ports
    let mut port = config.port;
    let max_tries = 5;
    for attempt in 1..=max_tries {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        match axum::Server::try_bind(&addr) {
            Ok(server) => {
                info!("Server started at http://localhost:{}", port);
                info!("API Documentation: http://localhost:{}/docs", port);
                info!(
                    "Notifications WebSocket: ws://localhost:{}/api/notifications/ws",
                    port
                );
                return server
                    .serve(app.into_make_service())
                    .await
                    .map_err(|e| e.into());
            }
            Err(_) => {
                if attempt == max_tries {
                    return Err("Failed to bind to any port".into());
                }
                port += 1;
            }
        }
    }

    Err("Failed to bind to any port".into())
}
