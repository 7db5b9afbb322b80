use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lumiglow_api::models::*;
use serde_json::json;

use crate::errors::{ApiError, RequestError, error_body};
use crate::services::{LightingInput, LightingPipeline, LightingRequest, LightingStatus};

const DEFAULT_AUDIO_MIME: &str = "audio/wav";

#[derive(Clone)]
pub struct LightingState {
    pub pipeline: Arc<LightingPipeline>,
}

pub fn lighting_router(state: LightingState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/lighting/audio", post(light_from_audio))
        .route("/api/lighting/surprise", post(light_from_history))
        .route("/api/lighting/results", post(deliver_result))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

impl IntoResponse for LightingStatus {
    fn into_response(self) -> Response {
        match self {
            LightingStatus::Success {
                recommendation,
                request_id,
            } => Json(LightingResponse {
                recommendation,
                request_id,
            })
            .into_response(),
            LightingStatus::ValidationFailed { reason } => {
                let status = StatusCode::BAD_REQUEST;
                (status, error_body(status, &reason, None)).into_response()
            }
            LightingStatus::AuthFailed => {
                let status = StatusCode::UNAUTHORIZED;
                (status, error_body(status, "Authentication failed", None)).into_response()
            }
            LightingStatus::DeviceUnreachable { request_id } => {
                let status = StatusCode::NOT_FOUND;
                let body = error_body(
                    status,
                    "Device not connected",
                    Some(("request_id", json!(request_id))),
                );
                (status, body).into_response()
            }
            LightingStatus::DeliveryFailed { request_id, reason } => {
                let status = StatusCode::BAD_GATEWAY;
                let body = error_body(
                    status,
                    &format!("Failed to deliver to device: {reason}"),
                    Some(("request_id", json!(request_id))),
                );
                (status, body).into_response()
            }
            LightingStatus::PartialTimeout {
                request_id,
                pending,
            } => {
                let status = StatusCode::GATEWAY_TIMEOUT;
                let pending: Vec<String> = pending.iter().map(ToString::to_string).collect();
                let body = error_body(
                    status,
                    &format!("Timed out waiting for {} (request {})", pending.join(", "), request_id),
                    Some(("pending", json!(pending))),
                );
                (status, body).into_response()
            }
        }
    }
}

fn require(value: &str, name: &'static str) -> Result<(), RequestError> {
    if value.trim().is_empty() {
        return Err(RequestError::MissingParameter(name));
    }

    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/lighting/audio",
    tag = "lighting",
    request_body = AudioLightingRequest,
    responses(
        (status = 200, description = "Light set from the recording", body = LightingResponse),
        (status = 400, description = "Bad request or no valid recommendation"),
        (status = 401, description = "Invalid uuid or PIN"),
        (status = 404, description = "Device not connected, recommendation saved"),
        (status = 502, description = "Device rejected the command"),
        (status = 504, description = "Delivery or persistence timed out")
    )
)]
pub async fn light_from_audio(
    State(state): State<LightingState>,
    Json(body): Json<AudioLightingRequest>,
) -> Result<LightingStatus, ApiError> {
    require(&body.uuid, "uuid")?;
    require(&body.pin, "pin")?;
    require(&body.file, "file")?;

    let data = STANDARD
        .decode(body.file.trim())
        .map_err(|_| RequestError::InvalidEncoding)?;

    tracing::info!(identity = %body.uuid, bytes = data.len(), "audio lighting request");

    let status = state
        .pipeline
        .handle_lighting_request(LightingRequest {
            identity: body.uuid,
            secret: body.pin,
            input: LightingInput::Audio {
                mime_type: body
                    .mime_type
                    .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string()),
                data,
            },
            timestamp: body.timestamp,
            request_id: None,
        })
        .await;

    Ok(status)
}

#[utoipa::path(
    post,
    path = "/api/lighting/surprise",
    tag = "lighting",
    request_body = SurpriseLightingRequest,
    responses(
        (status = 200, description = "Light set from past patterns", body = LightingResponse),
        (status = 400, description = "Bad request or no valid recommendation"),
        (status = 401, description = "Invalid uuid or PIN"),
        (status = 404, description = "Device not connected, recommendation saved"),
        (status = 502, description = "Device rejected the command"),
        (status = 504, description = "Delivery or persistence timed out")
    )
)]
pub async fn light_from_history(
    State(state): State<LightingState>,
    Json(body): Json<SurpriseLightingRequest>,
) -> Result<LightingStatus, ApiError> {
    require(&body.uuid, "uuid")?;
    require(&body.pin, "pin")?;

    tracing::info!(identity = %body.uuid, "surprise lighting request");

    let status = state
        .pipeline
        .handle_lighting_request(LightingRequest {
            identity: body.uuid,
            secret: body.pin,
            input: LightingInput::Surprise,
            timestamp: body.timestamp,
            request_id: None,
        })
        .await;

    Ok(status)
}

#[utoipa::path(
    post,
    path = "/api/lighting/results",
    tag = "lighting",
    request_body = ResultDeliveryRequest,
    responses(
        (status = 200, description = "Descriptor saved and sent", body = LightingResponse),
        (status = 400, description = "Bad request or invalid descriptor"),
        (status = 401, description = "Invalid uuid or PIN"),
        (status = 404, description = "Device not connected, descriptor saved"),
        (status = 502, description = "Device rejected the command"),
        (status = 504, description = "Delivery or persistence timed out")
    )
)]
pub async fn deliver_result(
    State(state): State<LightingState>,
    Json(body): Json<ResultDeliveryRequest>,
) -> Result<LightingStatus, ApiError> {
    require(&body.uuid, "uuid")?;
    require(&body.pin, "pin")?;

    let status = state
        .pipeline
        .handle_lighting_request(LightingRequest {
            identity: body.uuid,
            secret: body.pin,
            input: LightingInput::Descriptor(body.descriptor),
            timestamp: body.timestamp,
            request_id: body.request_id,
        })
        .await;

    Ok(status)
}
