//! Seams between the lighting pipeline and the services it talks to.
//!
//! Every collaborator is injected as an `Arc<dyn ...>` so request handling
//! never reaches for process-wide clients.

use async_trait::async_trait;
use lumiglow_api::models::PatternRecord;
use serde_json::Value;

use crate::errors::{GenerationError, PushError, StoreError};
use crate::models::ResponseRecord;

/// Input handed to the generative model.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    /// A voice recording describing the user's situation.
    Audio { mime_type: String, data: Vec<u8> },
    /// Past descriptors around the current time, for "surprise me".
    History { records: Vec<PatternRecord> },
}

#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the raw model output, expected to be a JSON descriptor.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[async_trait]
pub trait CredentialLookup: Send + Sync {
    async fn authenticate(&self, identity: &str, secret: &str) -> bool;
}

#[async_trait]
pub trait IrCodeLookup: Send + Sync {
    async fn get_code(&self, device_type: &str, row_id: i32) -> Result<Option<String>, StoreError>;
}

#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    async fn get_channel(&self, identity: &str) -> Result<Option<String>, StoreError>;

    async fn set_channel(&self, identity: &str, handle: &str) -> Result<(), StoreError>;

    async fn clear_channel(&self, identity: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
}

/// Attributes stored next to the keys of one response record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordAttributes {
    pub request_id: String,
    pub emotion_tag: String,
    pub light_setting: Value,
    pub context: String,
}

/// Inclusive range of sort keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKeyRange {
    pub start: String,
    pub end: String,
}

#[async_trait]
pub trait TableStore: Send + Sync {
    /// Writes a record; writing the same request id again overwrites it.
    async fn put(
        &self,
        partition_key: &str,
        sort_key: &str,
        attributes: RecordAttributes,
    ) -> Result<(), StoreError>;

    /// Records with a sort key inside `range`, highest sort key first.
    async fn query(
        &self,
        partition_key: &str,
        range: &SortKeyRange,
        limit: u32,
    ) -> Result<Vec<ResponseRecord>, StoreError>;
}

#[async_trait]
pub trait DevicePush: Send + Sync {
    async fn send(&self, channel: &str, bytes: Vec<u8>) -> Result<(), PushError>;
}
