use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Error, Pool, Sqlite, Transaction};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::errors::StoreError;
use crate::models::ResponseRecord;
use crate::services::{RecordAttributes, SortKeyRange, TableStore};

#[derive(Clone)]
pub struct ResponseRepository {
    storage: Arc<Storage>,
}

impl ResponseRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl ResponseRepository {
    /// Inserts the record, overwriting a previous write of the same request.
    pub async fn upsert(
        &self,
        item: &ResponseRecord,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO responses
                (partition_key, request_id, sort_key, emotion_tag, light_setting, context, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT(partition_key, request_id) DO UPDATE SET
                sort_key = excluded.sort_key,
                emotion_tag = excluded.emotion_tag,
                light_setting = excluded.light_setting,
                context = excluded.context,
                created_at = excluded.created_at
            "#,
        )
        .bind(&item.partition_key)
        .bind(&item.request_id)
        .bind(&item.sort_key)
        .bind(&item.emotion_tag)
        .bind(&item.light_setting)
        .bind(&item.context)
        .bind(item.created_at)
        .execute(&mut **transaction)
        .await?;

        Ok(())
    }

    pub async fn find_in_sort_range(
        &self,
        partition_key: &str,
        start: &str,
        end: &str,
        limit: i64,
    ) -> Result<Vec<ResponseRecord>, Error> {
        let records: Vec<ResponseRecord> = sqlx::query_as(
            r#"
            SELECT * FROM responses
            WHERE partition_key = $1 AND sort_key BETWEEN $2 AND $3
            ORDER BY sort_key DESC, created_at DESC
            LIMIT $4
            "#,
        )
        .bind(partition_key)
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(records)
    }
}

#[async_trait]
impl TableStore for ResponseRepository {
    async fn put(
        &self,
        partition_key: &str,
        sort_key: &str,
        attributes: RecordAttributes,
    ) -> Result<(), StoreError> {
        let record = ResponseRecord {
            partition_key: partition_key.to_string(),
            request_id: attributes.request_id,
            sort_key: sort_key.to_string(),
            emotion_tag: attributes.emotion_tag,
            light_setting: attributes.light_setting,
            context: attributes.context,
            created_at: OffsetDateTime::now_utc(),
        };

        let mut tx = self.get_pool().begin().await?;
        self.upsert(&record, &mut tx).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn query(
        &self,
        partition_key: &str,
        range: &SortKeyRange,
        limit: u32,
    ) -> Result<Vec<ResponseRecord>, StoreError> {
        Ok(self
            .find_in_sort_range(partition_key, &range.start, &range.end, i64::from(limit))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::repositories::tests::*;

    use super::*;

    fn attributes(request_id: &str, context: &str) -> RecordAttributes {
        RecordAttributes {
            request_id: request_id.to_string(),
            emotion_tag: "Neutral".to_string(),
            light_setting: json!({"power": true, "color": [255, 255, 250]}),
            context: context.to_string(),
        }
    }

    #[tokio::test]
    async fn test_put_same_request_overwrites() {
        let storage = setup_test_db().await;
        let repo = ResponseRepository::new(storage.clone());

        repo.put("uuid#u1", "DAY#0#TIME#14:00:00", attributes("r1", "first"))
            .await
            .unwrap();
        repo.put("uuid#u1", "DAY#0#TIME#14:00:00", attributes("r1", "second"))
            .await
            .unwrap();

        let whole_week = SortKeyRange {
            start: "DAY#0".to_string(),
            end: "DAY#7".to_string(),
        };
        let records = repo.query("uuid#u1", &whole_week, 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].context, "second");
        assert_eq!(records[0].light_setting["color"], json!([255, 255, 250]));
    }

    #[tokio::test]
    async fn test_query_range_is_descending_and_limited() {
        let storage = setup_test_db().await;
        let repo = ResponseRepository::new(storage.clone());

        for (request_id, sort_key) in [
            ("a", "DAY#0#TIME#13:00:00"),
            ("b", "DAY#0#TIME#14:00:00"),
            ("c", "DAY#0#TIME#14:20:00"),
            ("d", "DAY#0#TIME#14:43:00"),
            ("e", "DAY#1#TIME#14:30:00"),
        ] {
            repo.put("uuid#u1", sort_key, attributes(request_id, request_id))
                .await
                .unwrap();
        }
        repo.put("uuid#u2", "DAY#0#TIME#14:10:00", attributes("x", "other"))
            .await
            .unwrap();

        let range = SortKeyRange {
            start: "DAY#0#TIME#13:30:00".to_string(),
            end: "DAY#0#TIME#15:30:00".to_string(),
        };

        let records = repo.query("uuid#u1", &range, 20).await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.request_id.as_str()).collect();
        assert_eq!(ids, vec!["d", "c", "b"]);

        let limited = repo.query("uuid#u1", &range, 2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].request_id, "d");
    }
}
