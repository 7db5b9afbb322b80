use serde::{Deserialize, Serialize};

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IrCode {
    pub device_type: String,
    pub id: i32,
    pub ir_code: String,
}

#[derive(Clone)]
pub struct IrCodeTable;

impl Table for IrCodeTable {
    fn name(&self) -> &'static str {
        "ir_codes"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS ir_codes (
                device_type VARCHAR(64) NOT NULL,
                id INTEGER NOT NULL,
                ir_code VARCHAR(255) NOT NULL,
                PRIMARY KEY (device_type, id)
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS ir_codes;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
