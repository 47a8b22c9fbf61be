use std::sync::Arc;

use protocol::DeleteUserResponse;
use protocol::Password;
use protocol::UpdateUserPasswordRequest;
use protocol::UpdateUserRequest;
use protocol::UserView;
use rpc::RpcError;

use crate::domain::identity::IdentityClient;

/// Gateway side of user management.
///
/// Access control happens before these methods are called.
pub struct UsersService<IC>
where
    IC: IdentityClient,
{
    identity: Arc<IC>,
}

impl<IC> UsersService<IC>
where
    IC: IdentityClient,
{
    pub fn new(identity: Arc<IC>) -> Self {
        Self { identity }
    }

    pub async fn list_users(&self) -> Result<Vec<UserView>, RpcError> {
        self.identity.find_all_users().await
    }

    pub async fn get_user(&self, id: &str) -> Result<UserView, RpcError> {
        self.identity.find_user_by_id(id).await
    }

    /// Change username and/or email of `id`.
    ///
    /// # Arguments
    /// * `id` - Target user id
    /// * `username` - New username, unchanged when `None`
    /// * `email` - New email, unchanged when `None`
    ///
    /// # Errors
    /// Whatever the identity service or the transport reports
    pub async fn update_user(
        &self,
        id: &str,
        username: Option<String>,
        email: Option<String>,
    ) -> Result<UserView, RpcError> {
        let user = self
            .identity
            .update_user(UpdateUserRequest {
                id: id.to_string(),
                username,
                email,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User profile updated");
        Ok(user)
    }

    pub async fn update_password(
        &self,
        id: &str,
        new_password: Password,
    ) -> Result<UserView, RpcError> {
        let user = self
            .identity
            .update_user_password(UpdateUserPasswordRequest {
                id: id.to_string(),
                new_password,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User password updated");
        Ok(user)
    }

    pub async fn delete_user(&self, id: &str) -> Result<DeleteUserResponse, RpcError> {
        let response = self.identity.delete_user(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use rpc::RemoteError;

    use super::*;
    use crate::domain::identity::mock::MockIdentityClient;

    #[tokio::test]
    async fn test_update_user_builds_partial_request() {
        let mut identity = MockIdentityClient::new();
        identity
            .expect_update_user()
            .withf(|request| {
                request.id == "u-1"
                    && request.username.is_none()
                    && request.email.as_deref() == Some("new@x.com")
            })
            .times(1)
            .returning(|_| Err(RpcError::Remote(RemoteError::not_found("User not found: u-1"))));

        let service = UsersService::new(Arc::new(identity));

        let error = service
            .update_user("u-1", None, Some("new@x.com".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(error, RpcError::Remote(e) if e.status_code == 404));
    }

    #[tokio::test]
    async fn test_update_password_sends_new_password() {
        let mut identity = MockIdentityClient::new();
        identity
            .expect_update_user_password()
            .withf(|request| request.id == "u-1" && request.new_password.expose() == "Fresh1!")
            .times(1)
            .returning(|_| Err(RpcError::ServiceUnavailable("closed".to_string())));

        let service = UsersService::new(Arc::new(identity));

        let result = service.update_password("u-1", Password::new("Fresh1!")).await;
        assert!(matches!(result, Err(RpcError::ServiceUnavailable(_))));
    }
}
