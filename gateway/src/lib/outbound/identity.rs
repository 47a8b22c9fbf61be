use async_trait::async_trait;
use auth::Role;
use protocol::AuthResult;
use protocol::DeleteUserRequest;
use protocol::DeleteUserResponse;
use protocol::FindAllUsersRequest;
use protocol::FindUserByIdRequest;
use protocol::GetUserCountByRoleRequest;
use protocol::GetUserCountRequest;
use protocol::LoginRequest;
use protocol::RegisterRequest;
use protocol::UpdateUserPasswordRequest;
use protocol::UpdateUserRequest;
use protocol::UserView;
use protocol::ValidateUserRequest;
use rpc::ClientConfig;
use rpc::RpcClient;
use rpc::RpcError;

use crate::domain::identity::IdentityClient;

/// Identity client speaking the RPC transport.
///
/// The underlying connection is opened on the first call, so constructing the client never
/// fails even when the identity service is down.
pub struct RpcIdentityClient {
    client: RpcClient,
}

impl RpcIdentityClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: RpcClient::new(config),
        }
    }
}

#[async_trait]
impl IdentityClient for RpcIdentityClient {
    async fn register(&self, request: RegisterRequest) -> Result<AuthResult, RpcError> {
        self.client.call(&request).await
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthResult, RpcError> {
        self.client.call(&request).await
    }

    async fn validate_user(&self, request: ValidateUserRequest) -> Result<AuthResult, RpcError> {
        self.client.call(&request).await
    }

    async fn find_all_users(&self) -> Result<Vec<UserView>, RpcError> {
        self.client.call(&FindAllUsersRequest::default()).await
    }

    async fn find_user_by_id(&self, id: &str) -> Result<UserView, RpcError> {
        self.client
            .call(&FindUserByIdRequest { id: id.to_string() })
            .await
    }

    async fn update_user(&self, request: UpdateUserRequest) -> Result<UserView, RpcError> {
        self.client.call(&request).await
    }

    async fn update_user_password(
        &self,
        request: UpdateUserPasswordRequest,
    ) -> Result<UserView, RpcError> {
        self.client.call(&request).await
    }

    async fn delete_user(&self, id: &str) -> Result<DeleteUserResponse, RpcError> {
        self.client
            .call(&DeleteUserRequest { id: id.to_string() })
            .await
    }

    async fn get_user_count(&self) -> Result<u64, RpcError> {
        self.client.call(&GetUserCountRequest::default()).await
    }

    async fn get_user_count_by_role(&self, role: Role) -> Result<u64, RpcError> {
        self.client.call(&GetUserCountByRoleRequest { role }).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn test_unreachable_service_is_reported_as_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let client = RpcIdentityClient::new(
            ClientConfig::new(address).with_connect_timeout(Duration::from_millis(500)),
        );

        let error = client.get_user_count().await.unwrap_err();
        assert!(matches!(error, RpcError::ServiceUnavailable(_)));
    }
}
