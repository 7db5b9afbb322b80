use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::extract::ws::Message as WsMessage;
use lumiglow_server::app::{AppServices, create_router};
use lumiglow_server::configs::{DEFAULT_MAX_BODY_BYTES, Database, SchemaManager, Storage};
use lumiglow_server::errors::{GenerationError, StoreError};
use lumiglow_server::models::{Credential, IrCode, ResponseRecord};
use lumiglow_server::repositories::{
    ConnectionRepository, CredentialRepository, IrCodeRepository, ResponseRepository,
};
use lumiglow_server::services::*;
use tokio::sync::mpsc;

pub const RED_DESCRIPTOR: &str = r#"{
    "context": "test",
    "emotion": {"main": "Positive", "subcategories": ["Happy", "Excited", "Proud"]},
    "lightSetting": {"power": true, "color": ["255", "0", "0"]},
    "recommendation": "red"
}"#;

/// Answers every generation request with the same text.
pub struct FixedGenerator {
    output: String,
    pub calls: AtomicU32,
}

#[async_trait]
impl Generator for FixedGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

#[derive(Default)]
pub struct MemoryObjects {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjects {
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjects {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }
}

pub struct MockApp {
    pub storage: Arc<Storage>,
    pub router: Router,
    pub hub: DeviceHub,
    pub generator: Arc<FixedGenerator>,
    pub objects: Arc<MemoryObjects>,
    pub connection_repository: Arc<ConnectionRepository>,
    pub response_repository: Arc<ResponseRepository>,
}

impl MockApp {
    /// App with identity `u1` / PIN `1234` and IR codes `ir-{row}` for "light".
    pub async fn new(generator_output: &str) -> Self {
        let storage = Arc::new(
            Storage::new(
                Database {
                    migration_path: None,
                    clean_start: true,
                    url: String::from("sqlite::memory:"),
                },
                SchemaManager::default(),
            )
            .await
            .unwrap(),
        );

        let credential_repository = Arc::new(CredentialRepository::new(storage.clone()));
        let ir_code_repository = Arc::new(IrCodeRepository::new(storage.clone()));
        let connection_repository = Arc::new(ConnectionRepository::new(storage.clone()));
        let response_repository = Arc::new(ResponseRepository::new(storage.clone()));

        let auth_service = AuthService::new();
        let mut tx = storage.get_pool().begin().await.unwrap();
        credential_repository
            .upsert(
                &Credential {
                    uuid: "u1".to_string(),
                    pin_hash: auth_service.hash("1234").unwrap(),
                },
                &mut tx,
            )
            .await
            .unwrap();
        for id in 0..20 {
            ir_code_repository
                .upsert(
                    &IrCode {
                        device_type: "light".to_string(),
                        id,
                        ir_code: format!("ir-{id}"),
                    },
                    &mut tx,
                )
                .await
                .unwrap();
        }
        tx.commit().await.unwrap();

        let generator = Arc::new(FixedGenerator {
            output: generator_output.to_string(),
            calls: AtomicU32::new(0),
        });
        let objects = Arc::new(MemoryObjects::default());
        let hub = DeviceHub::new();

        let orchestrator = DeliveryOrchestrator::new(
            CommandResolver::new(ir_code_repository),
            "light",
            connection_repository.clone(),
            Arc::new(hub.clone()),
            objects.clone(),
            response_repository.clone(),
        );

        let pipeline = LightingPipeline::new(
            Arc::new(CredentialService::new(auth_service, credential_repository)),
            RetryController::new(generator.clone(), RetryPolicy::new(3, Duration::ZERO)),
            PatternLookup::new(response_repository.clone(), 20),
            orchestrator,
            Duration::from_secs(5),
        );

        let router = create_router(AppServices {
            pipeline: Arc::new(pipeline),
            connection_repository: connection_repository.clone(),
            hub: hub.clone(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        });

        Self {
            storage,
            router,
            hub,
            generator,
            objects,
            connection_repository,
            response_repository,
        }
    }

    /// Every stored response record of `uuid`, latest sort key first.
    pub async fn stored_records(&self, uuid: &str) -> Vec<ResponseRecord> {
        let whole_week = SortKeyRange {
            start: "DAY#0".to_string(),
            end: "DAY#7".to_string(),
        };

        self.response_repository
            .query(&format!("uuid#{uuid}"), &whole_week, 100)
            .await
            .unwrap()
    }

    pub async fn stored_record(&self, uuid: &str, request_id: &str) -> Option<ResponseRecord> {
        self.stored_records(uuid)
            .await
            .into_iter()
            .find(|record| record.request_id == request_id)
    }

    /// Registers a live socket for `uuid` and returns what the device receives.
    pub async fn connect_device(&self, uuid: &str) -> mpsc::UnboundedReceiver<WsMessage> {
        let connection_id = format!("conn-{uuid}");
        let (tx, rx) = mpsc::unbounded_channel();

        self.hub.attach(&connection_id, tx).await;
        self.connection_repository
            .set_channel(uuid, &connection_id)
            .await
            .unwrap();

        rx
    }
}
