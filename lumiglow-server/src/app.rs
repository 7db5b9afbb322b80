use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::configs::{SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::repositories::{
    ConnectionRepository, CredentialRepository, IrCodeRepository, ResponseRepository,
};
use crate::services::{
    AuthService, CommandResolver, CredentialService, DeliveryOrchestrator, DeviceHub,
    FileObjectStore, GeminiClient, LightingPipeline, PatternLookup, RetryController, RetryPolicy,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "LumiGlow API", version = env!("CARGO_PKG_VERSION")),
    paths(
        crate::handles::light_from_audio,
        crate::handles::light_from_history,
        crate::handles::deliver_result,
        crate::handles::get_connection,
    ),
    tags(
        (name = "lighting", description = "Lighting recommendations"),
        (name = "device", description = "Device connections"),
    )
)]
pub struct ApiDoc;

/// Everything the router needs, built once per process.
#[derive(Clone)]
pub struct AppServices {
    pub pipeline: Arc<LightingPipeline>,
    pub connection_repository: Arc<ConnectionRepository>,
    pub hub: DeviceHub,
    /// Body size cap of the lighting endpoints
    pub max_body_bytes: usize,
}

pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<Router> {
    let storage = Arc::new(Storage::new(settings.database.clone(), SchemaManager::default()).await?);

    let credential_repository = Arc::new(CredentialRepository::new(storage.clone()));
    let ir_code_repository = Arc::new(IrCodeRepository::new(storage.clone()));
    let connection_repository = Arc::new(ConnectionRepository::new(storage.clone()));
    let response_repository = Arc::new(ResponseRepository::new(storage.clone()));

    let hub = DeviceHub::new();
    let pipeline_settings = &settings.pipeline;

    let orchestrator = DeliveryOrchestrator::new(
        CommandResolver::new(ir_code_repository),
        pipeline_settings.device_type.clone(),
        connection_repository.clone(),
        Arc::new(hub.clone()),
        Arc::new(FileObjectStore::new(&settings.object_storage.root)),
        response_repository.clone(),
    );

    let retry = RetryController::new(
        Arc::new(GeminiClient::new(settings.generation.clone())?),
        RetryPolicy::new(pipeline_settings.max_attempts, pipeline_settings.retry_delay()),
    );

    let pipeline = LightingPipeline::new(
        Arc::new(CredentialService::new(AuthService::new(), credential_repository)),
        retry,
        PatternLookup::new(response_repository, pipeline_settings.history_limit),
        orchestrator,
        pipeline_settings.deadline(),
    );

    Ok(create_router(AppServices {
        pipeline: Arc::new(pipeline),
        connection_repository,
        hub,
        max_body_bytes: settings.server.max_body_bytes,
    }))
}

pub fn create_router(services: AppServices) -> Router {
    Router::new()
        .merge(lighting_router(
            LightingState {
                pipeline: services.pipeline.clone(),
            },
            services.max_body_bytes,
        ))
        .merge(device_router(DeviceState {
            connection_repository: services.connection_repository.clone(),
        }))
        .merge(socket_router(SocketState {
            connection_repository: services.connection_repository.clone(),
            hub: services.hub.clone(),
        }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
