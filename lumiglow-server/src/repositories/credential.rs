use std::sync::Arc;

use sqlx::{Error, Pool, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::Credential;

#[derive(Clone)]
pub struct CredentialRepository {
    storage: Arc<Storage>,
}

impl CredentialRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl CredentialRepository {
    pub async fn upsert(
        &self,
        item: &Credential,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO credentials (uuid, pin_hash)
            VALUES ($1, $2)
            ON CONFLICT(uuid) DO UPDATE SET pin_hash = excluded.pin_hash
            "#,
        )
        .bind(&item.uuid)
        .bind(&item.pin_hash)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn find_by_uuid(&self, uuid: &str) -> Result<Option<Credential>, Error> {
        let credential: Option<Credential> =
            sqlx::query_as("SELECT * FROM credentials WHERE uuid = $1")
                .bind(uuid)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(credential)
    }
}
