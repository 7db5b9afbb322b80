use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash};
use async_trait::async_trait;

use crate::models::Credential;
use crate::repositories::CredentialRepository;
use crate::services::CredentialLookup;

#[derive(Debug, Clone)]
pub struct Argon2Hash(Argon2<'static>);

#[derive(Clone)]
pub struct AuthService {
    hasher: Arc<Argon2Hash>,
}

impl AuthService {
    pub fn new() -> Self {
        let hash = Argon2Hash(Argon2::default());

        Self {
            hasher: Arc::new(hash),
        }
    }

    pub fn hash(&self, pin: &str) -> Result<String, password_hash::Error> {
        let hash_salt = SaltString::generate(&mut rand_core::OsRng);
        let hash = self.hasher.0.hash_password(pin.as_ref(), &hash_salt)?;

        Ok(hash.to_string())
    }

    pub fn verify(&self, credential: &Credential, pin: &str) -> Result<bool, password_hash::Error> {
        let parsed_hash = PasswordHash::new(&credential.pin_hash)?;

        Ok(self
            .hasher
            .0
            .verify_password(pin.as_ref(), &parsed_hash)
            .is_ok())
    }
}

impl Default for AuthService {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks identity/PIN pairs against the stored credential hashes.
#[derive(Clone)]
pub struct CredentialService {
    auth_service: AuthService,
    repository: Arc<CredentialRepository>,
}

impl CredentialService {
    pub fn new(auth_service: AuthService, repository: Arc<CredentialRepository>) -> Self {
        Self {
            auth_service,
            repository,
        }
    }
}

#[async_trait]
impl CredentialLookup for CredentialService {
    async fn authenticate(&self, identity: &str, secret: &str) -> bool {
        let credential = match self.repository.find_by_uuid(identity).await {
            Ok(Some(credential)) => credential,
            Ok(None) => {
                tracing::warn!(identity, "no credential registered");
                return false;
            }
            Err(e) => {
                tracing::error!(identity, "failed to load credential: {}", e);
                return false;
            }
        };

        match self.auth_service.verify(&credential, secret) {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!(identity, "invalid PIN provided");
                false
            }
            Err(e) => {
                tracing::error!(identity, "stored PIN hash is unreadable: {}", e);
                false
            }
        }
    }
}
