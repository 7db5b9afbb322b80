use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use lumiglow_api::models::ConnectionStatusResponse;

use crate::errors::{ApiError, DeviceError};
use crate::repositories::ConnectionRepository;

#[derive(Clone)]
pub struct DeviceState {
    pub connection_repository: Arc<ConnectionRepository>,
}

pub fn device_router(state: DeviceState) -> Router {
    Router::new()
        .route("/api/devices/:uuid/connection", get(get_connection))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/devices/{uuid}/connection",
    tag = "device",
    params(
        ("uuid" = String, Path, description = "Device identity")
    ),
    responses(
        (status = 200, description = "Device is connected", body = ConnectionStatusResponse),
        (status = 404, description = "Device not connected"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_connection(
    State(state): State<DeviceState>,
    Path(uuid): Path<String>,
) -> Result<Json<ConnectionStatusResponse>, ApiError> {
    let connection = state
        .connection_repository
        .find_by_uuid(&uuid)
        .await?
        .ok_or(DeviceError::NotConnected)?;

    Ok(Json(ConnectionStatusResponse {
        uuid: connection.uuid,
        connection_id: connection.connection_id,
    }))
}
