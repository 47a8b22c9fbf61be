use std::sync::Arc;

use protocol::AuthResult;
use protocol::LoginRequest;
use protocol::RegisterRequest;
use protocol::ValidateUserRequest;
use rpc::RpcError;

use crate::domain::identity::IdentityClient;

/// Gateway side of registration and sign-in.
///
/// Input has already passed HTTP validation; the identity service makes every decision.
pub struct AuthService<IC>
where
    IC: IdentityClient,
{
    identity: Arc<IC>,
}

impl<IC> AuthService<IC>
where
    IC: IdentityClient,
{
    pub fn new(identity: Arc<IC>) -> Self {
        Self { identity }
    }

    /// Register a new account.
    ///
    /// # Errors
    /// Whatever the identity service or the transport reports
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResult, RpcError> {
        let result = self.identity.register(request).await?;
        tracing::info!(user_id = %result.user.id, "User registered");
        Ok(result)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    /// Whatever the identity service or the transport reports
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResult, RpcError> {
        let result = self.identity.login(request).await?;
        tracing::debug!(user_id = %result.user.id, "User logged in");
        Ok(result)
    }

    pub async fn validate_user(
        &self,
        request: ValidateUserRequest,
    ) -> Result<AuthResult, RpcError> {
        self.identity.validate_user(request).await
    }
}
