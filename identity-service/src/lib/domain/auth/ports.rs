use async_trait::async_trait;

use crate::domain::auth::models::Authenticated;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::RegisterCommand;
use crate::user::errors::UserError;

/// Port for registration and credential validation.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account with the default role set and sign a token for it.
    ///
    /// # Arguments
    /// * `command` - Validated username, email and password
    ///
    /// # Returns
    /// Token and created user
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered (checked first)
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Password` - Hashing failed
    /// * `Token` - Token could not be signed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Authenticated, UserError>;

    /// Check credentials and sign a token for the matching account.
    ///
    /// # Arguments
    /// * `credentials` - Email and plaintext password
    ///
    /// # Returns
    /// Token and authenticated user
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password, indistinguishably
    /// * `Token` - Token could not be signed
    /// * `DatabaseError` - Database operation failed
    async fn validate_user(&self, credentials: Credentials) -> Result<Authenticated, UserError>;

    /// Same behaviour as [`AuthServicePort::validate_user`].
    async fn login(&self, credentials: Credentials) -> Result<Authenticated, UserError> {
        self.validate_user(credentials).await
    }
}
