use async_trait::async_trait;
use auth::HashParams;
use auth::PasswordError;
use auth::PasswordHasher;

use crate::user::ports::CredentialHasher;

/// Argon2id credential hasher.
///
/// Hashing is CPU-bound, so every call runs on the blocking thread pool.
#[derive(Clone)]
pub struct Argon2CredentialHasher {
    hasher: PasswordHasher,
}

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self {
            hasher: PasswordHasher::new(),
        }
    }

    /// Hasher with explicit cost parameters, e.g. cheap ones in tests.
    pub fn with_params(params: HashParams) -> Self {
        Self {
            hasher: PasswordHasher::with_params(params),
        }
    }
}

impl Default for Argon2CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
    }

    async fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let digest = digest.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| PasswordError::VerificationFailed(e.to_string()))?
    }
}
