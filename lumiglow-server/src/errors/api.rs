use super::{DeviceError, RequestError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request error: {0}")]
    RequestError(#[from] RequestError),

    #[error("Device error: {0}")]
    DeviceError(#[from] DeviceError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Database(e) => ApiError::DatabaseError(e),
            other => ApiError::InternalError(other.into()),
        }
    }
}
