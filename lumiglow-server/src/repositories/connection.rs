use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Error, Pool, Sqlite, Transaction};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::errors::StoreError;
use crate::models::Connection;
use crate::services::ConnectionRegistry;

#[derive(Clone)]
pub struct ConnectionRepository {
    storage: Arc<Storage>,
}

impl ConnectionRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl ConnectionRepository {
    /// Maps the identity to a new connection id, replacing any older one.
    pub async fn upsert(
        &self,
        item: &Connection,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query("DELETE FROM connections WHERE connection_id = $1 AND uuid <> $2")
            .bind(&item.connection_id)
            .bind(&item.uuid)
            .execute(&mut **transaction)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO connections (uuid, connection_id, connected_at)
            VALUES ($1, $2, $3)
            ON CONFLICT(uuid) DO UPDATE
                SET connection_id = excluded.connection_id, connected_at = excluded.connected_at
            "#,
        )
        .bind(&item.uuid)
        .bind(&item.connection_id)
        .bind(item.connected_at)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn find_by_uuid(&self, uuid: &str) -> Result<Option<Connection>, Error> {
        let connection: Option<Connection> =
            sqlx::query_as("SELECT * FROM connections WHERE uuid = $1")
                .bind(uuid)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(connection)
    }

    pub async fn delete_by_uuid(
        &self,
        uuid: &str,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query("DELETE FROM connections WHERE uuid = $1")
            .bind(uuid)
            .execute(&mut **transaction)
            .await?;

        Ok(())
    }

    /// Removes whichever identity currently owns `connection_id`.
    pub async fn delete_by_connection_id(
        &self,
        connection_id: &str,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let affected = sqlx::query("DELETE FROM connections WHERE connection_id = $1")
            .bind(connection_id)
            .execute(&mut **transaction)
            .await?
            .rows_affected();

        Ok(affected)
    }

    /// Drops the mapping of a closed socket. A newer socket of the same
    /// identity has a different id and is left alone.
    pub async fn clear_by_connection(&self, connection_id: &str) -> Result<u64, StoreError> {
        let mut tx = self.get_pool().begin().await?;
        let affected = self.delete_by_connection_id(connection_id, &mut tx).await?;
        tx.commit().await?;

        Ok(affected)
    }
}

#[async_trait]
impl ConnectionRegistry for ConnectionRepository {
    async fn get_channel(&self, identity: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .find_by_uuid(identity)
            .await?
            .map(|connection| connection.connection_id))
    }

    async fn set_channel(&self, identity: &str, handle: &str) -> Result<(), StoreError> {
        let connection = Connection {
            uuid: identity.to_string(),
            connection_id: handle.to_string(),
            connected_at: OffsetDateTime::now_utc(),
        };

        let mut tx = self.get_pool().begin().await?;
        self.upsert(&connection, &mut tx).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn clear_channel(&self, identity: &str) -> Result<(), StoreError> {
        let mut tx = self.get_pool().begin().await?;
        self.delete_by_uuid(identity, &mut tx).await?;
        tx.commit().await?;

        Ok(())
    }
}
