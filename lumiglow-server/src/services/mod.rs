mod auth_service;
mod collaborators;
mod command_resolver;
mod delivery_orchestrator;
pub mod descriptor_validator;
mod device_hub;
mod envelope;
mod gemini_client;
mod lighting_pipeline;
mod object_store;
mod pattern_lookup;
mod retry_controller;

pub use auth_service::*;
pub use collaborators::*;
pub use command_resolver::*;
pub use delivery_orchestrator::*;
pub use device_hub::*;
pub use envelope::*;
pub use gemini_client::*;
pub use lighting_pipeline::*;
pub use object_store::*;
pub use pattern_lookup::*;
pub use retry_controller::*;

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use lumiglow_api::models::{
        DeviceCommandSet, Emotion, EmotionCategory, LightSetting, LightingDescriptor,
    };
    use time::OffsetDateTime;
    use time::macros::time;

    use crate::errors::{GenerationError, PushError, StoreError};
    use crate::models::ResponseRecord;

    use super::*;

    pub const VALID_DESCRIPTOR: &str = r#"{
        "context": "test",
        "emotion": {"main": "Positive", "subcategories": ["Happy", "Excited", "Proud"]},
        "lightSetting": {"power": true, "color": ["255", "0", "0"]},
        "recommendation": "red"
    }"#;

    pub struct ScriptedGenerator {
        script: Mutex<VecDeque<Result<String, GenerationError>>>,
        fallback: String,
        pub calls: AtomicU32,
        pub requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        pub fn new(script: Vec<Result<String, GenerationError>>, fallback: &str) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                fallback: fallback.to_string(),
                calls: AtomicU32::new(0),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());

            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(self.fallback.clone()))
        }
    }

    pub struct StubCredentials {
        pub identity: String,
        pub secret: String,
    }

    #[async_trait]
    impl CredentialLookup for StubCredentials {
        async fn authenticate(&self, identity: &str, secret: &str) -> bool {
            identity == self.identity && secret == self.secret
        }
    }

    #[derive(Default)]
    pub struct StubLookup {
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl IrCodeLookup for StubLookup {
        async fn get_code(&self, _device_type: &str, row_id: i32) -> Result<Option<String>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(format!("code-{row_id}")))
        }
    }

    pub struct StubRegistry {
        channels: Mutex<HashMap<String, String>>,
    }

    impl StubRegistry {
        pub fn new(identity: &str, channel: Option<&str>) -> Self {
            let channels = channel
                .map(|channel| (identity.to_string(), channel.to_string()))
                .into_iter()
                .collect();

            Self {
                channels: Mutex::new(channels),
            }
        }
    }

    #[async_trait]
    impl ConnectionRegistry for StubRegistry {
        async fn get_channel(&self, identity: &str) -> Result<Option<String>, StoreError> {
            Ok(self.channels.lock().unwrap().get(identity).cloned())
        }

        async fn set_channel(&self, identity: &str, handle: &str) -> Result<(), StoreError> {
            self.channels
                .lock()
                .unwrap()
                .insert(identity.to_string(), handle.to_string());
            Ok(())
        }

        async fn clear_channel(&self, identity: &str) -> Result<(), StoreError> {
            self.channels.lock().unwrap().remove(identity);
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum PushMode {
        Ack,
        Hang,
        Reject,
    }

    pub struct StubPush {
        mode: PushMode,
        sent: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl StubPush {
        pub fn new(mode: PushMode) -> Self {
            Self {
                mode,
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn sent(&self) -> Vec<(String, Vec<u8>)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DevicePush for StubPush {
        async fn send(&self, channel: &str, bytes: Vec<u8>) -> Result<(), PushError> {
            match self.mode {
                PushMode::Ack => {
                    self.sent.lock().unwrap().push((channel.to_string(), bytes));
                    Ok(())
                }
                PushMode::Hang => std::future::pending().await,
                PushMode::Reject => Err(PushError::Rejected("firmware busy".to_string())),
            }
        }
    }

    #[derive(Default)]
    pub struct MemoryObjects {
        objects: Mutex<HashMap<String, Vec<u8>>>,
        pub fail: AtomicBool,
    }

    impl MemoryObjects {
        pub fn get(&self, key: &str) -> Option<Vec<u8>> {
            self.objects.lock().unwrap().get(key).cloned()
        }

        pub fn len(&self) -> usize {
            self.objects.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryObjects {
        async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }

            self.objects.lock().unwrap().insert(key.to_string(), bytes);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MemoryTable {
        records: Mutex<Vec<(String, String, RecordAttributes)>>,
    }

    impl MemoryTable {
        pub fn records(&self) -> Vec<(String, String, RecordAttributes)> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TableStore for MemoryTable {
        async fn put(
            &self,
            partition_key: &str,
            sort_key: &str,
            attributes: RecordAttributes,
        ) -> Result<(), StoreError> {
            let mut records = self.records.lock().unwrap();
            records.retain(|(pk, _, existing)| {
                !(pk == partition_key && existing.request_id == attributes.request_id)
            });
            records.push((partition_key.to_string(), sort_key.to_string(), attributes));
            Ok(())
        }

        async fn query(
            &self,
            partition_key: &str,
            range: &SortKeyRange,
            limit: u32,
        ) -> Result<Vec<ResponseRecord>, StoreError> {
            let mut matching: Vec<ResponseRecord> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|(pk, sk, _)| {
                    pk == partition_key && *sk >= range.start && *sk <= range.end
                })
                .map(|(pk, sk, attributes)| ResponseRecord {
                    partition_key: pk.clone(),
                    request_id: attributes.request_id.clone(),
                    sort_key: sk.clone(),
                    emotion_tag: attributes.emotion_tag.clone(),
                    light_setting: attributes.light_setting.clone(),
                    context: attributes.context.clone(),
                    created_at: OffsetDateTime::now_utc(),
                })
                .collect();

            matching.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
            matching.truncate(limit as usize);
            Ok(matching)
        }
    }

    pub struct Stubs {
        pub lookup: Arc<StubLookup>,
        pub registry: Arc<StubRegistry>,
        pub push: Arc<StubPush>,
        pub objects: Arc<MemoryObjects>,
        pub table: Arc<MemoryTable>,
    }

    impl Stubs {
        /// Stubs where identity `u1` is connected on `channel`, if any.
        pub fn new(channel: Option<&str>, mode: PushMode) -> Self {
            Self {
                lookup: Arc::new(StubLookup::default()),
                registry: Arc::new(StubRegistry::new("u1", channel)),
                push: Arc::new(StubPush::new(mode)),
                objects: Arc::new(MemoryObjects::default()),
                table: Arc::new(MemoryTable::default()),
            }
        }

        pub fn orchestrator(&self) -> DeliveryOrchestrator {
            DeliveryOrchestrator::new(
                CommandResolver::new(self.lookup.clone()),
                "light",
                self.registry.clone(),
                self.push.clone(),
                self.objects.clone(),
                self.table.clone(),
            )
        }
    }

    pub fn red_descriptor() -> LightingDescriptor {
        LightingDescriptor {
            context: "test".to_string(),
            emotion: Emotion {
                main: EmotionCategory::Positive,
                subcategories: vec!["Happy".into(), "Excited".into(), "Proud".into()],
            },
            light_setting: LightSetting {
                power: true,
                color: Some([255, 0, 0]),
                dynamic_effect: None,
            },
            recommendation: "red".to_string(),
        }
    }

    /// Envelope for a red descriptor sent on Monday at 14:30.
    pub fn envelope(
        identity: &str,
        request_id: &str,
        command_set: Option<DeviceCommandSet>,
    ) -> Arc<DeliveryEnvelope> {
        Arc::new(DeliveryEnvelope {
            identity: identity.to_string(),
            request_id: request_id.to_string(),
            descriptor: red_descriptor(),
            raw: VALID_DESCRIPTOR.to_string(),
            command_set,
            timestamp: EnvelopeTime::new(0, time!(14:30)),
        })
    }
}
