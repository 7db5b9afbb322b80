use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Connection {
    pub uuid: String,
    pub connection_id: String,
    pub connected_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct ConnectionTable;

impl Table for ConnectionTable {
    fn name(&self) -> &'static str {
        "connections"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS connections (
                uuid VARCHAR(255) PRIMARY KEY NOT NULL,
                connection_id VARCHAR(64) NOT NULL UNIQUE,
                connected_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS connections;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
