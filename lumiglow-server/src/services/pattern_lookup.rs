use std::sync::Arc;

use lumiglow_api::models::PatternRecord;
use time::{Duration, Time};

use crate::errors::StoreError;
use crate::models::ResponseRecord;
use crate::services::envelope::{partition_key, sort_key};
use crate::services::{EnvelopeTime, SortKeyRange, TableStore};

const RADIUS_SECONDS: i64 = 60 * 60;
const LAST_SECOND_OF_DAY: i64 = 24 * 60 * 60 - 1;

/// One hour either side of a reference time, never crossing midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternWindow {
    pub identity: String,
    /// Monday = 0
    pub weekday: u8,
    pub start_time: Time,
    pub end_time: Time,
}

impl PatternWindow {
    pub fn around(identity: &str, reference: EnvelopeTime) -> Self {
        let (hour, minute, second) = reference.time.as_hms();
        let seconds = i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second);

        let start = (seconds - RADIUS_SECONDS).max(0);
        let end = (seconds + RADIUS_SECONDS).min(LAST_SECOND_OF_DAY);

        Self {
            identity: identity.to_string(),
            weekday: reference.weekday,
            start_time: Time::MIDNIGHT + Duration::seconds(start),
            end_time: Time::MIDNIGHT + Duration::seconds(end),
        }
    }

    pub fn sort_key_range(&self) -> SortKeyRange {
        SortKeyRange {
            start: sort_key(self.weekday, self.start_time),
            end: sort_key(self.weekday, self.end_time),
        }
    }
}

/// Past descriptors of the same identity around the current time of week.
#[derive(Clone)]
pub struct PatternLookup {
    table: Arc<dyn TableStore>,
    limit: u32,
}

impl PatternLookup {
    pub fn new(table: Arc<dyn TableStore>, limit: u32) -> Self {
        Self { table, limit }
    }

    /// Most recent first. An empty result is normal for new identities.
    pub async fn window(
        &self,
        identity: &str,
        reference: EnvelopeTime,
    ) -> Result<Vec<PatternRecord>, StoreError> {
        let window = PatternWindow::around(identity, reference);
        let range = window.sort_key_range();

        tracing::debug!(identity, start = %range.start, end = %range.end, "querying pattern window");

        let records = self
            .table
            .query(&partition_key(identity), &range, self.limit)
            .await?;

        Ok(records.into_iter().filter_map(to_pattern).collect())
    }
}

fn to_pattern(record: ResponseRecord) -> Option<PatternRecord> {
    let Some(time) = EnvelopeTime::from_sort_key(&record.sort_key) else {
        tracing::warn!(sort_key = %record.sort_key, "skipping record with unreadable sort key");
        return None;
    };

    Some(PatternRecord {
        request_id: record.request_id,
        weekday: time.weekday,
        time: time.time_string(),
        emotion_tag: record.emotion_tag,
        light_setting: record.light_setting,
        context: record.context,
    })
}
