use serde::{Deserialize, Serialize};

/// Day of week as sent by clients, either `3` or `"3"`.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayOfWeek {
    Number(i64),
    Text(String),
}

/// Client local time. `dayOfWeek` counts from Sunday = 0.
///
/// Request bodies carry the timestamp as raw JSON and the server parses it
/// into this shape, so a malformed one never rejects the request.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTimestamp {
    /// `HH:MM` or `HH:MM:SS`
    pub time: String,
    pub day_of_week: DayOfWeek,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioLightingRequest {
    /// Device identity
    pub uuid: String,
    pub pin: String,
    /// Base64 encoded recording
    pub file: String,
    /// Mime type of the recording, `audio/wav` when absent
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
    #[cfg_attr(feature = "docs", schema(value_type = Option<ClientTimestamp>))]
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurpriseLightingRequest {
    /// Device identity
    pub uuid: String,
    pub pin: String,
    #[cfg_attr(feature = "docs", schema(value_type = Option<ClientTimestamp>))]
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDeliveryRequest {
    /// Device identity
    pub uuid: String,
    pub pin: String,
    /// Request id chosen by the caller; generated when absent
    #[serde(default, rename = "requestId", alias = "request_id")]
    pub request_id: Option<String>,
    /// Generated descriptor, still unvalidated
    pub descriptor: serde_json::Value,
    #[cfg_attr(feature = "docs", schema(value_type = Option<ClientTimestamp>))]
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightingResponse {
    pub recommendation: String,
    pub request_id: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatusResponse {
    pub uuid: String,
    pub connection_id: String,
}
