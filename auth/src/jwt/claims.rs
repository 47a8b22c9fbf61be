use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;
use crate::identity::Identity;
use crate::roles::Role;

/// Claims carried by an identity token.
///
/// Every field is optional on the wire so that a decoded token missing a required claim can be
/// reported as such instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Claims {
    /// Subject (user identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default)]
    pub roles: Vec<Role>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Build claims for a user identity.
    ///
    /// # Arguments
    /// * `identity` - Identity to encode
    /// * `issued_at` - Issue instant
    /// * `ttl` - Validity window added to `issued_at`
    ///
    /// # Returns
    /// Claims with sub, email, username, roles, iat and exp set
    pub fn for_identity(identity: &Identity, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: Some(identity.user_id.clone()),
            email: Some(identity.email.clone()),
            username: Some(identity.username.clone()),
            roles: identity.roles.clone(),
            iat: Some(issued_at.timestamp()),
            exp: Some((issued_at + ttl).timestamp()),
        }
    }

    /// Convert decoded claims into a verified identity.
    ///
    /// # Errors
    /// * `MissingClaim` - `sub` or `email` is absent or empty
    pub fn into_identity(self) -> Result<Identity, JwtError> {
        let user_id = self
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| JwtError::MissingClaim("sub".to_string()))?;
        let email = self
            .email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| JwtError::MissingClaim("email".to_string()))?;

        Ok(Identity {
            user_id,
            email,
            username: self.username.unwrap_or_default(),
            roles: self.roles,
        })
    }
}
