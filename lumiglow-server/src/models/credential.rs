use serde::{Deserialize, Serialize};

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Credential {
    pub uuid: String,
    pub pin_hash: String,
}

#[derive(Clone)]
pub struct CredentialTable;

impl Table for CredentialTable {
    fn name(&self) -> &'static str {
        "credentials"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS credentials (
                uuid VARCHAR(255) PRIMARY KEY NOT NULL,
                pin_hash VARCHAR(255) NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS credentials;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
