use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::Message as WsMessage;
use tokio::sync::{RwLock, mpsc};

use crate::errors::PushError;
use crate::services::DevicePush;

/// Outbound halves of the device websockets held by this process, keyed by
/// connection id.
#[derive(Clone, Default)]
pub struct DeviceHub {
    channels: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<WsMessage>>>>,
}

impl DeviceHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn attach(&self, connection_id: &str, sender: mpsc::UnboundedSender<WsMessage>) {
        let mut channels = self.channels.write().await;
        channels.insert(connection_id.to_string(), sender);
    }

    pub async fn detach(&self, connection_id: &str) -> bool {
        let mut channels = self.channels.write().await;
        channels.remove(connection_id).is_some()
    }
}

#[async_trait]
impl DevicePush for DeviceHub {
    async fn send(&self, channel: &str, bytes: Vec<u8>) -> Result<(), PushError> {
        let sender = {
            let channels = self.channels.read().await;
            channels.get(channel).cloned()
        }
        .ok_or_else(|| PushError::UnknownChannel(channel.to_string()))?;

        let message = match String::from_utf8(bytes) {
            Ok(text) => WsMessage::Text(text),
            Err(e) => WsMessage::Binary(e.into_bytes()),
        };

        if sender.send(message).is_err() {
            self.detach(channel).await;
            return Err(PushError::ChannelClosed(channel.to_string()));
        }

        Ok(())
    }
}
