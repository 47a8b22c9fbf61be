use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use thiserror::Error;

use crate::identity::Identity;
use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::secret::SigningSecret;

/// Token verification and issuing failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Token could not be signed.
    #[error("Token signing failed: {0}")]
    Signing(String),

    /// Token is malformed, expired or carries a bad signature.
    #[error("Invalid or expired token: {0}")]
    Unauthorized(JwtError),

    /// Token is authentic but lacks a required identity claim.
    #[error("Invalid token payload: {0}")]
    InvalidPayload(String),
}

/// Issues and verifies signed, time-bounded identity tokens.
///
/// Pure function of the signing secret and the clock; holds no per-token state, so tokens
/// cannot be revoked before they expire.
pub struct TokenService {
    handler: JwtHandler,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Arguments
    /// * `secret` - Validated signing secret
    /// * `ttl` - Validity window of issued tokens
    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        Self {
            handler: JwtHandler::new(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for an identity, valid from now.
    ///
    /// # Errors
    /// * `Signing` - Encoding failed
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token for an identity with an explicit issue instant.
    ///
    /// # Arguments
    /// * `identity` - Claims source
    /// * `issued_at` - `iat`; `exp` is `issued_at + ttl`
    ///
    /// # Errors
    /// * `Signing` - Encoding failed
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims::for_identity(identity, issued_at, self.ttl);
        self.handler
            .encode(&claims)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and extract the identity it carries.
    ///
    /// # Arguments
    /// * `token` - Compact JWT string
    ///
    /// # Returns
    /// Identity with user id, email, username and roles
    ///
    /// # Errors
    /// * `Unauthorized` - Bad signature, expired, malformed, or no `exp`
    /// * `InvalidPayload` - `sub` or `email` missing
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let claims: Claims = self.handler.decode(token).map_err(TokenError::Unauthorized)?;

        claims.into_identity().map_err(|e| match e {
            JwtError::MissingClaim(claim) => TokenError::InvalidPayload(claim),
            other => TokenError::Unauthorized(other),
        })
    }
}
