use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use super::Table;

/// Indexable copy of a delivered descriptor, queried by time window.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResponseRecord {
    /// `uuid#{identity}`
    pub partition_key: String,
    pub request_id: String,
    /// `DAY#{weekday}#TIME#{HH:MM:SS}`
    pub sort_key: String,
    pub emotion_tag: String,
    pub light_setting: Value,
    pub context: String,
    pub created_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct ResponseTable;

impl Table for ResponseTable {
    fn name(&self) -> &'static str {
        "responses"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                partition_key VARCHAR(255) NOT NULL,
                request_id VARCHAR(64) NOT NULL,
                sort_key VARCHAR(64) NOT NULL,
                emotion_tag VARCHAR(32) NOT NULL,
                light_setting JSON NOT NULL DEFAULT '{}',
                context TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (partition_key, request_id)
            );
            CREATE INDEX IF NOT EXISTS idx_responses_sort_key
                ON responses (partition_key, sort_key);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS responses;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
