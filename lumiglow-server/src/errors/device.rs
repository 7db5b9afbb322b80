use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device not connected")]
    NotConnected,
}

impl DeviceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeviceError::NotConnected => StatusCode::NOT_FOUND,
        }
    }
}

/// Failure to hand bytes to a device's live channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    #[error("No live channel {0}")]
    UnknownChannel(String),

    #[error("Channel {0} closed")]
    ChannelClosed(String),

    #[error("Push rejected: {0}")]
    Rejected(String),
}
