use lumiglow_api::models::{ClientTimestamp, DayOfWeek, DeviceCommandSet, LightingDescriptor};
use serde::Deserialize;
use serde_json::Value;
use time::{OffsetDateTime, Time};

use crate::errors::{RequestError, StoreError};
use crate::services::RecordAttributes;

/// Local weekday and time of day a request was made at.
///
/// Weekdays are counted from Monday = 0, which is the numbering baked into
/// stored sort keys. Client timestamps count from Sunday = 0 and are
/// converted exactly once, in [`EnvelopeTime::from_client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeTime {
    pub weekday: u8,
    pub time: Time,
}

impl EnvelopeTime {
    pub fn new(weekday: u8, time: Time) -> Self {
        Self {
            weekday: weekday % 7,
            time,
        }
    }

    /// Server local time, or UTC when the local offset is unknown.
    pub fn now() -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let time = Time::from_hms(now.hour(), now.minute(), now.second()).unwrap_or(Time::MIDNIGHT);

        Self::new(now.weekday().number_days_from_monday(), time)
    }

    pub fn from_client(timestamp: &ClientTimestamp) -> Result<Self, RequestError> {
        let sunday_based = match &timestamp.day_of_week {
            DayOfWeek::Number(day) => Some(*day),
            DayOfWeek::Text(day) => day.trim().parse::<i64>().ok(),
        }
        .filter(|day| (0..7).contains(day))
        .ok_or_else(|| {
            RequestError::InvalidTimestamp(format!("day of week {:?}", timestamp.day_of_week))
        })?;

        let time = parse_time(&timestamp.time)
            .ok_or_else(|| RequestError::InvalidTimestamp(format!("time {:?}", timestamp.time)))?;

        Ok(Self::new(((sunday_based + 6) % 7) as u8, time))
    }

    /// Parses a timestamp taken verbatim from a request body.
    pub fn from_value(value: &Value) -> Result<Self, RequestError> {
        let timestamp = ClientTimestamp::deserialize(value)
            .map_err(|e| RequestError::InvalidTimestamp(e.to_string()))?;

        Self::from_client(&timestamp)
    }

    /// Uses the client's clock when it sent a usable one.
    pub fn resolve(timestamp: Option<&Value>) -> Self {
        match timestamp.map(Self::from_value) {
            Some(Ok(time)) => time,
            Some(Err(e)) => {
                tracing::warn!("falling back to server time: {}", e);
                Self::now()
            }
            None => Self::now(),
        }
    }

    pub fn time_string(&self) -> String {
        format_time(self.time)
    }

    /// `DAY#{weekday}#TIME#{HH:MM:SS}`, ordered lexically by weekday then time.
    pub fn sort_key(&self) -> String {
        sort_key(self.weekday, self.time)
    }

    pub fn from_sort_key(key: &str) -> Option<Self> {
        let rest = key.strip_prefix("DAY#")?;
        let (day, time) = rest.split_once("#TIME#")?;
        let weekday = day.parse::<u8>().ok().filter(|day| *day < 7)?;

        Some(Self::new(weekday, parse_time(time)?))
    }
}

pub(crate) fn sort_key(weekday: u8, time: Time) -> String {
    format!("DAY#{}#TIME#{}", weekday, format_time(time))
}

fn format_time(time: Time) -> String {
    format!("{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second())
}

/// `HH:MM` or `HH:MM:SS`.
fn parse_time(text: &str) -> Option<Time> {
    let mut parts = text.trim().split(':');
    let hour = parts.next()?.parse::<u8>().ok()?;
    let minute = parts.next()?.parse::<u8>().ok()?;
    let second = match parts.next() {
        Some(second) => second.parse::<u8>().ok()?,
        None => 0,
    };

    if parts.next().is_some() {
        return None;
    }

    Time::from_hms(hour, minute, second).ok()
}

/// Everything the fan-out stage needs for one request. Built once after
/// validation and only read afterwards.
#[derive(Debug, Clone)]
pub struct DeliveryEnvelope {
    pub identity: String,
    pub request_id: String,
    pub descriptor: LightingDescriptor,
    /// Descriptor text exactly as generated or submitted
    pub raw: String,
    /// Resolved lazily by the device task when absent
    pub command_set: Option<DeviceCommandSet>,
    pub timestamp: EnvelopeTime,
}

impl DeliveryEnvelope {
    pub fn partition_key(&self) -> String {
        partition_key(&self.identity)
    }

    pub fn object_key(&self) -> String {
        format!("responses/{}/{}.json", self.identity, self.request_id)
    }

    /// The object store keeps the unnormalized text; the table keeps the
    /// canonical form.
    pub fn object_body(&self) -> Vec<u8> {
        self.raw.as_bytes().to_vec()
    }

    pub fn record_attributes(&self) -> Result<RecordAttributes, StoreError> {
        Ok(RecordAttributes {
            request_id: self.request_id.clone(),
            emotion_tag: self.descriptor.emotion.main.to_string(),
            light_setting: serde_json::to_value(&self.descriptor.light_setting)?,
            context: self.descriptor.context.clone(),
        })
    }
}

pub(crate) fn partition_key(identity: &str) -> String {
    format!("uuid#{identity}")
}
