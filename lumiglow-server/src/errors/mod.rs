pub mod api;
pub mod device;
pub mod generation;
pub mod pipeline;
pub mod request;
pub mod store;
pub mod validation;

pub use api::ApiError;
pub use device::{DeviceError, PushError};
pub use generation::GenerationError;
pub use pipeline::AcquireError;
pub use request::RequestError;
pub use store::StoreError;
pub use validation::ValidationError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use uuid::Uuid;

/// Builds the `{"error": {...}}` body shared by every failing response.
pub fn error_body(status: StatusCode, message: &str, extra: Option<(&str, Value)>) -> Json<Value> {
    let mut error_obj = json!({
        "code": status.as_u16(),
        "message": message
    });

    if let Some((key, value)) = extra {
        error_obj[key] = value;
    }

    Json(json!({ "error": error_obj }))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_id) = match self {
            ApiError::RequestError(e) => (e.status_code(), e.to_string(), None),
            ApiError::DeviceError(e) => (e.status_code(), e.to_string(), None),
            ApiError::DatabaseError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
            ApiError::InternalError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
        };

        let body = error_body(
            status,
            &error_message,
            error_id.map(|id| ("error_id", json!(id))),
        );

        (status, body).into_response()
    }
}
