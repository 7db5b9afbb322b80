use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::services::descriptor_validator;
use crate::services::{
    CredentialLookup, DeliveryEnvelope, DeliveryOrchestrator, DeliveryOutcome, EnvelopeTime,
    FanOutTask, GenerationRequest, PatternLookup, RetryController,
};

/// What the descriptor is generated from.
#[derive(Debug, Clone)]
pub enum LightingInput {
    Audio { mime_type: String, data: Vec<u8> },
    /// Generate from the identity's history around the current time.
    Surprise,
    /// A descriptor generated earlier; validated once, never regenerated.
    Descriptor(Value),
}

#[derive(Debug, Clone)]
pub struct LightingRequest {
    pub identity: String,
    pub secret: String,
    pub input: LightingInput,
    /// Raw client timestamp; unusable ones fall back to server time
    pub timestamp: Option<Value>,
    /// Generated when absent
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightingStatus {
    Success {
        recommendation: String,
        request_id: String,
    },
    ValidationFailed {
        reason: String,
    },
    AuthFailed,
    DeviceUnreachable {
        request_id: String,
    },
    DeliveryFailed {
        request_id: String,
        reason: String,
    },
    PartialTimeout {
        request_id: String,
        pending: Vec<FanOutTask>,
    },
}

/// Authentication, acquisition and fan-out of one lighting request.
#[derive(Clone)]
pub struct LightingPipeline {
    credentials: Arc<dyn CredentialLookup>,
    retry: RetryController,
    patterns: PatternLookup,
    orchestrator: DeliveryOrchestrator,
    deadline: Duration,
}

impl LightingPipeline {
    pub fn new(
        credentials: Arc<dyn CredentialLookup>,
        retry: RetryController,
        patterns: PatternLookup,
        orchestrator: DeliveryOrchestrator,
        deadline: Duration,
    ) -> Self {
        Self {
            credentials,
            retry,
            patterns,
            orchestrator,
            deadline,
        }
    }

    pub async fn handle_lighting_request(&self, request: LightingRequest) -> LightingStatus {
        let identity = request.identity.as_str();

        if !self.credentials.authenticate(identity, &request.secret).await {
            return LightingStatus::AuthFailed;
        }

        let timestamp = EnvelopeTime::resolve(request.timestamp.as_ref());

        let acquired = match request.input {
            LightingInput::Audio { mime_type, data } => {
                let generation = GenerationRequest::Audio { mime_type, data };
                self.retry
                    .acquire_valid_descriptor(&generation)
                    .await
                    .map(|acquired| (acquired.descriptor, acquired.raw))
                    .map_err(|e| e.to_string())
            }
            LightingInput::Surprise => {
                let records = match self.patterns.window(identity, timestamp).await {
                    Ok(records) => records,
                    Err(e) => {
                        tracing::warn!(identity, "pattern lookup failed, using no history: {}", e);
                        Vec::new()
                    }
                };
                tracing::debug!(identity, records = records.len(), "pattern window loaded");

                let generation = GenerationRequest::History { records };
                self.retry
                    .acquire_valid_descriptor(&generation)
                    .await
                    .map(|acquired| (acquired.descriptor, acquired.raw))
                    .map_err(|e| e.to_string())
            }
            LightingInput::Descriptor(value) => {
                let raw = value.to_string();
                descriptor_validator::validate_value(value)
                    .map(|descriptor| (descriptor, raw))
                    .map_err(|e| e.to_string())
            }
        };

        let (descriptor, raw) = match acquired {
            Ok(acquired) => acquired,
            Err(reason) => {
                tracing::warn!(identity, "no usable descriptor: {}", reason);
                return LightingStatus::ValidationFailed { reason };
            }
        };

        let request_id = request
            .request_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let recommendation = descriptor.recommendation.clone();

        let envelope = Arc::new(DeliveryEnvelope {
            identity: request.identity.clone(),
            request_id: request_id.clone(),
            descriptor,
            raw,
            command_set: None,
            timestamp,
        });

        let report = self.orchestrator.deliver(envelope, self.deadline).await;
        tracing::info!(
            identity,
            request_id = %request_id,
            outcome = ?report.outcome,
            object_stored = report.object_stored,
            record_stored = report.record_stored,
            "lighting request handled"
        );

        match report.outcome {
            DeliveryOutcome::Delivered => LightingStatus::Success {
                recommendation,
                request_id,
            },
            DeliveryOutcome::DeviceUnreachable => LightingStatus::DeviceUnreachable { request_id },
            DeliveryOutcome::DeliveryFailed { reason } => {
                LightingStatus::DeliveryFailed { request_id, reason }
            }
            DeliveryOutcome::PartialTimeout { pending } => {
                LightingStatus::PartialTimeout {
                    request_id,
                    pending,
                }
            }
        }
    }
}
