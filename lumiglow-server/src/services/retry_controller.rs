use std::sync::Arc;
use std::time::Duration;

use lumiglow_api::models::LightingDescriptor;

use crate::errors::{AcquireError, GenerationError, ValidationError};
use crate::services::descriptor_validator;
use crate::services::{GenerationRequest, Generator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Pause between two attempts. Attempts never overlap.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::ZERO)
    }
}

/// A descriptor that made it through validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquired {
    pub descriptor: LightingDescriptor,
    /// Model output exactly as received
    pub raw: String,
    pub attempts: u32,
}

#[derive(Debug, thiserror::Error)]
enum AttemptFailure {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug)]
enum AcquireState {
    Attempting(u32),
    Success(Acquired),
    Exhausted(u32),
}

/// Asks the generator for a descriptor until one validates or the attempt
/// budget runs out.
#[derive(Clone)]
pub struct RetryController {
    generator: Arc<dyn Generator>,
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(generator: Arc<dyn Generator>, policy: RetryPolicy) -> Self {
        Self { generator, policy }
    }

    pub async fn acquire_valid_descriptor(
        &self,
        request: &GenerationRequest,
    ) -> Result<Acquired, AcquireError> {
        let mut state = AcquireState::Attempting(1);

        loop {
            state = match state {
                AcquireState::Attempting(attempt) => self.step(attempt, request).await,
                AcquireState::Success(acquired) => {
                    tracing::info!(attempts = acquired.attempts, "descriptor acquired");
                    return Ok(acquired);
                }
                AcquireState::Exhausted(attempts) => {
                    tracing::error!(attempts, "no valid descriptor, giving up");
                    return Err(AcquireError::NoValidResponse { attempts });
                }
            };
        }
    }

    async fn step(&self, attempt: u32, request: &GenerationRequest) -> AcquireState {
        match self.attempt(request).await {
            Ok((descriptor, raw)) => AcquireState::Success(Acquired {
                descriptor,
                raw,
                attempts: attempt,
            }),
            Err(e) => {
                tracing::warn!(attempt, max_attempts = self.policy.max_attempts, "attempt failed: {}", e);

                if attempt >= self.policy.max_attempts {
                    AcquireState::Exhausted(attempt)
                } else {
                    if !self.policy.delay.is_zero() {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                    AcquireState::Attempting(attempt + 1)
                }
            }
        }
    }

    async fn attempt(
        &self,
        request: &GenerationRequest,
    ) -> Result<(LightingDescriptor, String), AttemptFailure> {
        let raw = self.generator.generate(request).await?;
        let descriptor = descriptor_validator::validate(&raw)?;

        Ok((descriptor, raw))
    }
}
