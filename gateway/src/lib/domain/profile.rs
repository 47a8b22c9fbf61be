use std::sync::Arc;

use auth::Role;
use rpc::RpcError;
use serde::Serialize;

use crate::domain::identity::IdentityClient;

/// User totals shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub total_users: u64,
    pub admin_users: u64,
}

/// Profile views built from the caller's token and identity-service counts.
pub struct ProfileService<IC>
where
    IC: IdentityClient,
{
    identity: Arc<IC>,
}

impl<IC> ProfileService<IC>
where
    IC: IdentityClient,
{
    pub fn new(identity: Arc<IC>) -> Self {
        Self { identity }
    }

    /// Count all users and ADMIN users.
    ///
    /// Both calls are issued concurrently over the shared connection.
    ///
    /// # Errors
    /// The first failure of either call
    pub async fn admin_summary(&self) -> Result<AdminSummary, RpcError> {
        let (total_users, admin_users) = tokio::try_join!(
            self.identity.get_user_count(),
            self.identity.get_user_count_by_role(Role::Admin),
        )?;

        Ok(AdminSummary {
            total_users,
            admin_users,
        })
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;
    use crate::domain::identity::mock::MockIdentityClient;

    #[tokio::test]
    async fn test_admin_summary_combines_counts() {
        let mut identity = MockIdentityClient::new();
        identity.expect_get_user_count().times(1).returning(|| Ok(5));
        identity
            .expect_get_user_count_by_role()
            .with(eq(Role::Admin))
            .times(1)
            .returning(|_| Ok(2));

        let service = ProfileService::new(Arc::new(identity));

        assert_eq!(
            service.admin_summary().await.unwrap(),
            AdminSummary {
                total_users: 5,
                admin_users: 2
            }
        );
    }

    #[tokio::test]
    async fn test_admin_summary_propagates_transport_failure() {
        let mut identity = MockIdentityClient::new();
        identity
            .expect_get_user_count()
            .returning(|| Err(RpcError::ServiceUnavailable("connection refused".to_string())));
        identity
            .expect_get_user_count_by_role()
            .returning(|_| Ok(1));

        let service = ProfileService::new(Arc::new(identity));

        let error = service.admin_summary().await.unwrap_err();
        assert!(error.is_transport());
    }
}
