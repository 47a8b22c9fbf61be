use async_trait::async_trait;
use auth::Role;
use protocol::AuthResult;
use protocol::DeleteUserResponse;
use protocol::LoginRequest;
use protocol::RegisterRequest;
use protocol::UpdateUserPasswordRequest;
use protocol::UpdateUserRequest;
use protocol::UserView;
use protocol::ValidateUserRequest;
use rpc::RpcError;

/// Port for identity operations owned by the identity service.
///
/// Every method is one remote call. Domain failures come back as `RpcError::Remote` with the
/// status code and message chosen by the identity service; transport failures are
/// `ServiceUnavailable` or `Timeout`.
#[async_trait]
pub trait IdentityClient: Send + Sync + 'static {
    /// Create an account and sign a token for it.
    ///
    /// # Arguments
    /// * `request` - Email, username and plaintext password
    ///
    /// # Returns
    /// Token plus the created user
    ///
    /// # Errors
    /// * `Remote` (409) - Email or username already in use
    /// * `Remote` (400) - Input rejected by the identity service
    /// * `ServiceUnavailable` / `Timeout` - Identity service unreachable
    async fn register(&self, request: RegisterRequest) -> Result<AuthResult, RpcError>;

    /// Authenticate with email and password.
    ///
    /// # Errors
    /// * `Remote` (401) - Invalid credentials
    /// * `ServiceUnavailable` / `Timeout` - Identity service unreachable
    async fn login(&self, request: LoginRequest) -> Result<AuthResult, RpcError>;

    /// Check email and password without any side effect beyond issuing a token.
    ///
    /// # Errors
    /// * `Remote` (401) - Invalid credentials
    /// * `ServiceUnavailable` / `Timeout` - Identity service unreachable
    async fn validate_user(&self, request: ValidateUserRequest) -> Result<AuthResult, RpcError>;

    /// Every registered user, newest first.
    async fn find_all_users(&self) -> Result<Vec<UserView>, RpcError>;

    /// Look up one user.
    ///
    /// # Errors
    /// * `Remote` (404) - No user with this id
    /// * `Remote` (400) - Malformed id
    async fn find_user_by_id(&self, id: &str) -> Result<UserView, RpcError>;

    /// Change username and/or email.
    ///
    /// # Errors
    /// * `Remote` (404) - No user with this id
    /// * `Remote` (409) - New email or username belongs to another user
    async fn update_user(&self, request: UpdateUserRequest) -> Result<UserView, RpcError>;

    /// Replace a user's password.
    ///
    /// # Errors
    /// * `Remote` (404) - No user with this id
    async fn update_user_password(
        &self,
        request: UpdateUserPasswordRequest,
    ) -> Result<UserView, RpcError>;

    /// Remove a user.
    ///
    /// # Errors
    /// * `Remote` (404) - No user with this id
    async fn delete_user(&self, id: &str) -> Result<DeleteUserResponse, RpcError>;

    /// Number of registered users.
    async fn get_user_count(&self) -> Result<u64, RpcError>;

    /// Number of users holding `role`.
    async fn get_user_count_by_role(&self, role: Role) -> Result<u64, RpcError>;
}
