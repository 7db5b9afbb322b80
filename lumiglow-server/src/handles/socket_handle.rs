use std::sync::Arc;

use axum::Router;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::errors::{ApiError, RequestError};
use crate::repositories::ConnectionRepository;
use crate::services::{ConnectionRegistry, DeviceHub};

#[derive(Clone)]
pub struct SocketState {
    pub connection_repository: Arc<ConnectionRepository>,
    pub hub: DeviceHub,
}

#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub uuid: Option<String>,
}

pub fn socket_router(state: SocketState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<ConnectQuery>,
    State(state): State<SocketState>,
) -> Result<Response, ApiError> {
    let uuid = query
        .uuid
        .filter(|uuid| !uuid.trim().is_empty())
        .ok_or(RequestError::MissingParameter("uuid"))?;

    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, uuid, state))
        .into_response())
}

async fn handle_socket(socket: WebSocket, uuid: String, state: SocketState) {
    let connection_id = Uuid::new_v4().to_string();
    let (mut sender, mut receiver) = socket.split();
    let (device_tx, mut device_rx) = mpsc::unbounded_channel::<WsMessage>();

    state.hub.attach(&connection_id, device_tx).await;

    if let Err(e) = state
        .connection_repository
        .set_channel(&uuid, &connection_id)
        .await
    {
        tracing::error!(identity = %uuid, "failed to register connection: {}", e);
        state.hub.detach(&connection_id).await;
        return;
    }

    tracing::info!(identity = %uuid, connection_id = %connection_id, "device connected");

    let send_task = tokio::spawn(async move {
        while let Some(message) = device_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(WsMessage::Text(text)) => {
                tracing::debug!(identity = %uuid, "device says: {}", text);
            }
            Ok(WsMessage::Close(_)) => break,
            Err(e) => {
                tracing::warn!(identity = %uuid, "websocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    state.hub.detach(&connection_id).await;

    match state
        .connection_repository
        .clear_by_connection(&connection_id)
        .await
    {
        Ok(_) => tracing::info!(identity = %uuid, connection_id = %connection_id, "device disconnected"),
        Err(e) => tracing::error!(identity = %uuid, "failed to clear connection: {}", e),
    }
}
