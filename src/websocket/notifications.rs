use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::notification::service::NotificationService;
use crate::notification::store::StoreEvent;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Encode a store event as a WebSocket text frame
fn event_message(event: &StoreEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            error!("Failed to serialize store event: {}", e);
            None
        }
    }
}

/// Push store events into a connection's outgoing queue. A receiver that
/// fell behind gets a fresh snapshot in place of the events it missed.
async fn forward_events(
    mut events: broadcast::Receiver<StoreEvent>,
    service: NotificationService,
    tx: mpsc::Sender<Message>,
    connection_id: Uuid,
) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(
                    "Connection {} lagged by {} events, resending snapshot",
                    connection_id, skipped
                );
                StoreEvent::Snapshot(service.snapshot().await)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        if let Some(message) = event_message(&event) {
            if tx.send(message).await.is_err() {
                break;
            }
        }
    }
}

/// Handle a WebSocket connection: push the current snapshot, then every
/// store event until the client goes away.
async fn handle_connection(socket: WebSocket, service: NotificationService) {
    let connection_id = Uuid::new_v4();
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(100);

    // Subscribe before taking the snapshot so nothing falls in between
    let events = service.subscribe();
    if let Some(message) = event_message(&StoreEvent::Snapshot(service.snapshot().await)) {
        if let Err(e) = tx.send(message).await {
            error!("Error queueing initial snapshot: {}", e);
        }
    }

    // Forward store events to the channel
    let events_task = tokio::spawn(forward_events(events, service, tx.clone(), connection_id));

    // Forward messages from channel to WebSocket
    let forward_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(e) = ws_sender.send(message).await {
                error!("Error forwarding message to WebSocket: {}", e);
                break;
            }
        }
    });

    // Heartbeat task
    let tx_heartbeat = tx.clone();
    let heartbeat_task = tokio::spawn(async move {
        let mut interval = time::interval(HEARTBEAT_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = tx_heartbeat.send(Message::Ping(vec![])).await {
                error!("Error sending heartbeat: {}", e);
                break;
            }
        }
    });

    // Process incoming WebSocket messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                info!("WebSocket closed by client");
                break;
            }
            Ok(Message::Pong(_)) => {
                debug!("Received pong from client");
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    // Clean up
    events_task.abort();
    forward_task.abort();
    heartbeat_task.abort();

    info!("WebSocket connection {} closed", connection_id);
}

/// Handle incoming WebSocket connection
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<NotificationService>,
) -> impl IntoResponse {
    info!("Client connected to notifications WebSocket");
    ws.on_upgrade(move |socket| async move {
        handle_connection(socket, service).await;
    })
}
