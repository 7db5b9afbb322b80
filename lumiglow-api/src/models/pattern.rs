use serde::{Deserialize, Serialize};

/// One historical descriptor returned by the time-window lookup.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRecord {
    pub request_id: String,
    /// Storage weekday, Monday is 0
    pub weekday: u8,
    /// Local time of day, `HH:MM:SS`
    pub time: String,
    pub emotion_tag: String,
    pub light_setting: serde_json::Value,
    pub context: String,
}
