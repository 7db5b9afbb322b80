use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Error, Pool, Sqlite, Transaction};

use crate::configs::Storage;
use crate::errors::StoreError;
use crate::models::IrCode;
use crate::services::IrCodeLookup;

#[derive(Clone)]
pub struct IrCodeRepository {
    storage: Arc<Storage>,
}

impl IrCodeRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl IrCodeRepository {
    pub async fn upsert(
        &self,
        item: &IrCode,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO ir_codes (device_type, id, ir_code)
            VALUES ($1, $2, $3)
            ON CONFLICT(device_type, id) DO UPDATE SET ir_code = excluded.ir_code
            "#,
        )
        .bind(&item.device_type)
        .bind(item.id)
        .bind(&item.ir_code)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn find(&self, device_type: &str, id: i32) -> Result<Option<IrCode>, Error> {
        let code: Option<IrCode> =
            sqlx::query_as("SELECT * FROM ir_codes WHERE device_type = $1 AND id = $2")
                .bind(device_type)
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(code)
    }
}

#[async_trait]
impl IrCodeLookup for IrCodeRepository {
    async fn get_code(&self, device_type: &str, row_id: i32) -> Result<Option<String>, StoreError> {
        Ok(self.find(device_type, row_id).await?.map(|row| row.ir_code))
    }
}

#[cfg(test)]
mod tests {
    use crate::repositories::tests::*;

    use super::*;

    #[tokio::test]
    async fn test_get_code_by_device_type_and_row() {
        let storage = setup_test_db().await;
        let repo = IrCodeRepository::new(storage.clone());

        let mut tx = storage.get_pool().begin().await.unwrap();
        for (device_type, id, code) in [("light", 18, "0xF7C03F"), ("light", 19, "0xF7E01F"), ("fan", 18, "0x10EF")] {
            repo.upsert(
                &IrCode {
                    device_type: device_type.to_string(),
                    id,
                    ir_code: code.to_string(),
                },
                &mut tx,
            )
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();

        assert_eq!(repo.get_code("light", 18).await.unwrap().as_deref(), Some("0xF7C03F"));
        assert_eq!(repo.get_code("fan", 18).await.unwrap().as_deref(), Some("0x10EF"));
        assert_eq!(repo.get_code("light", 7).await.unwrap(), None);
    }
}
