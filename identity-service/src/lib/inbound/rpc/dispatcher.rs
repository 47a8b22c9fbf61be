use std::sync::Arc;

use async_trait::async_trait;
use protocol::IdentityRequest;
use rpc::Handler;
use rpc::RemoteError;
use serde::Serialize;
use serde_json::Value;

use super::handlers::auth;
use super::handlers::users;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::ports::UserServicePort;

/// Routes decoded identity requests to their handlers.
///
/// Every pattern is a variant of [`IdentityRequest`], so adding one without a handler fails to
/// compile.
pub struct IdentityDispatcher<AS, US>
where
    AS: AuthServicePort,
    US: UserServicePort,
{
    auth_service: Arc<AS>,
    user_service: Arc<US>,
}

impl<AS, US> IdentityDispatcher<AS, US>
where
    AS: AuthServicePort,
    US: UserServicePort,
{
    pub fn new(auth_service: Arc<AS>, user_service: Arc<US>) -> Self {
        Self {
            auth_service,
            user_service,
        }
    }

    /// Run one typed request.
    ///
    /// # Returns
    /// JSON-encoded response of the request's pattern
    ///
    /// # Errors
    /// Domain errors converted to their wire form; internal details are logged, not returned
    pub async fn dispatch(&self, request: IdentityRequest) -> Result<Value, RemoteError> {
        let auth_service = self.auth_service.as_ref();
        let user_service = self.user_service.as_ref();

        match request {
            IdentityRequest::ValidateUser(request) => {
                encode(auth::validate_user(auth_service, request).await)
            }
            IdentityRequest::Register(request) => {
                encode(auth::register(auth_service, request).await)
            }
            IdentityRequest::Login(request) => encode(auth::login(auth_service, request).await),
            IdentityRequest::FindAllUsers(_) => {
                encode(users::find_all_users(user_service).await)
            }
            IdentityRequest::FindUserById(request) => {
                encode(users::find_user_by_id(user_service, request).await)
            }
            IdentityRequest::UpdateUser(request) => {
                encode(users::update_user(user_service, request).await)
            }
            IdentityRequest::UpdateUserPassword(request) => {
                encode(users::update_user_password(user_service, request).await)
            }
            IdentityRequest::DeleteUser(request) => {
                encode(users::delete_user(user_service, request).await)
            }
            IdentityRequest::GetUserCount(_) => {
                encode(users::get_user_count(user_service).await)
            }
            IdentityRequest::GetUserCountByRole(request) => {
                encode(users::get_user_count_by_role(user_service, request).await)
            }
        }
    }
}

fn encode<T: Serialize>(result: Result<T, RemoteError>) -> Result<Value, RemoteError> {
    let value = result?;
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(error = %e, "Failed to encode response payload");
        RemoteError::internal()
    })
}

#[async_trait]
impl<AS, US> Handler for IdentityDispatcher<AS, US>
where
    AS: AuthServicePort,
    US: UserServicePort,
{
    async fn handle(&self, pattern: &str, payload: Value) -> Result<Value, RemoteError> {
        let request = IdentityRequest::decode(pattern, payload).inspect_err(|e| {
            tracing::warn!(pattern = %pattern, error = %e, "Rejected request");
        })?;

        let result = self.dispatch(request).await;
        if let Err(e) = &result {
            tracing::warn!(
                pattern = %pattern,
                status_code = e.status_code,
                error_kind = %e.error_kind,
                message = %e.message,
                "Request failed"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use ::auth::Role;
    use mockall::mock;
    use mockall::predicate::*;
    use rpc::ErrorKind;
    use serde_json::json;

    use super::*;
    use crate::domain::auth::models::Authenticated;
    use crate::domain::auth::models::Credentials;
    use crate::domain::auth::models::RegisterCommand;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::NewPassword;
    use crate::domain::user::models::UpdateUserCommand;
    use crate::domain::user::models::User;
    use crate::domain::user::models::UserId;
    use crate::domain::user::models::Username;
    use crate::user::errors::UserError;

    mock! {
        pub TestAuthService {}

        #[async_trait]
        impl AuthServicePort for TestAuthService {
            async fn register(&self, command: RegisterCommand) -> Result<Authenticated, UserError>;
            async fn validate_user(&self, credentials: Credentials) -> Result<Authenticated, UserError>;
            async fn login(&self, credentials: Credentials) -> Result<Authenticated, UserError>;
        }
    }

    mock! {
        pub TestUserService {}

        #[async_trait]
        impl UserServicePort for TestUserService {
            async fn list_users(&self) -> Result<Vec<User>, UserError>;
            async fn get_user(&self, id: &UserId) -> Result<User, UserError>;
            async fn update_user(&self, id: &UserId, command: UpdateUserCommand) -> Result<User, UserError>;
            async fn update_password(&self, id: &UserId, password: NewPassword) -> Result<User, UserError>;
            async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;
            async fn count_users(&self) -> Result<u64, UserError>;
            async fn count_users_by_role(&self, role: Role) -> Result<u64, UserError>;
        }
    }

    fn sample_user() -> User {
        User::new(
            Username::new("alice".to_string()).unwrap(),
            EmailAddress::new("a@x.com".to_string()).unwrap(),
            "$argon2id$digest".to_string(),
            vec![Role::User],
        )
    }

    fn dispatcher(
        auth_service: MockTestAuthService,
        user_service: MockTestUserService,
    ) -> IdentityDispatcher<MockTestAuthService, MockTestUserService> {
        IdentityDispatcher::new(Arc::new(auth_service), Arc::new(user_service))
    }

    #[tokio::test]
    async fn test_register_returns_auth_result_without_digest() {
        let mut auth_service = MockTestAuthService::new();
        auth_service
            .expect_register()
            .withf(|command| {
                command.email.as_str() == "a@x.com"
                    && command.username.as_str() == "alice"
                    && command.password.expose() == "Secret123!"
            })
            .times(1)
            .returning(|_| {
                Ok(Authenticated {
                    token: "signed.token".to_string(),
                    user: sample_user(),
                })
            });

        let dispatcher = dispatcher(auth_service, MockTestUserService::new());

        let value = dispatcher
            .handle(
                "register",
                json!({ "email": "a@x.com", "username": "alice", "password": "Secret123!" }),
            )
            .await
            .unwrap();

        assert_eq!(value["token"], "signed.token");
        assert_eq!(value["user"]["email"], "a@x.com");
        assert!(!value.to_string().contains("$argon2id$digest"));
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_username_before_service() {
        let mut auth_service = MockTestAuthService::new();
        auth_service.expect_register().times(0);

        let dispatcher = dispatcher(auth_service, MockTestUserService::new());

        let error = dispatcher
            .handle(
                "register",
                json!({ "email": "a@x.com", "username": "a b", "password": "Secret123!" }),
            )
            .await
            .unwrap_err();

        assert_eq!(error.error_kind, ErrorKind::ValidationError);
    }

    #[tokio::test]
    async fn test_validate_user_alias_and_login_reach_service() {
        let mut auth_service = MockTestAuthService::new();
        auth_service
            .expect_validate_user()
            .withf(|credentials| credentials.email == "a@x.com")
            .times(1)
            .returning(|_| Err(UserError::InvalidCredentials));
        auth_service
            .expect_login()
            .times(1)
            .returning(|_| Err(UserError::InvalidCredentials));

        let dispatcher = dispatcher(auth_service, MockTestUserService::new());
        let payload = json!({ "email": "a@x.com", "password": "WrongPass" });

        let validate = dispatcher
            .handle("validateUser", payload.clone())
            .await
            .unwrap_err();
        let login = dispatcher.handle("login", payload).await.unwrap_err();

        assert_eq!(validate, login);
        assert_eq!(login.status_code, 401);
        assert_eq!(login.message, "Invalid credentials");
    }

    #[tokio::test]
    async fn test_find_user_by_id_not_found() {
        let mut user_service = MockTestUserService::new();
        user_service
            .expect_get_user()
            .times(1)
            .returning(|id| Err(UserError::NotFound(id.to_string())));

        let dispatcher = dispatcher(MockTestAuthService::new(), user_service);

        let error = dispatcher
            .handle("find_user_by_id", json!({ "id": UserId::new().to_string() }))
            .await
            .unwrap_err();

        assert_eq!(error.status_code, 404);
        assert_eq!(error.error_kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_malformed_id_is_validation_error() {
        let mut user_service = MockTestUserService::new();
        user_service.expect_delete_user().times(0);

        let dispatcher = dispatcher(MockTestAuthService::new(), user_service);

        let error = dispatcher
            .handle("delete_user", json!({ "id": "not-a-uuid" }))
            .await
            .unwrap_err();

        assert_eq!(error.status_code, 400);
    }

    #[tokio::test]
    async fn test_delete_user_returns_message() {
        let mut user_service = MockTestUserService::new();
        user_service
            .expect_delete_user()
            .times(1)
            .returning(|_| Ok(()));

        let dispatcher = dispatcher(MockTestAuthService::new(), user_service);

        let value = dispatcher
            .handle("delete_user", json!({ "id": UserId::new().to_string() }))
            .await
            .unwrap();

        assert_eq!(value, json!({ "message": "User deleted successfully" }));
    }

    #[tokio::test]
    async fn test_counts_are_plain_numbers() {
        let mut user_service = MockTestUserService::new();
        user_service.expect_count_users().returning(|| Ok(3));
        user_service
            .expect_count_users_by_role()
            .with(eq(Role::Admin))
            .returning(|_| Ok(1));

        let dispatcher = dispatcher(MockTestAuthService::new(), user_service);

        let total = dispatcher.handle("get_user_count", Value::Null).await.unwrap();
        let admins = dispatcher
            .handle("get_user_count_by_role", json!({ "role": "ADMIN" }))
            .await
            .unwrap();

        assert_eq!(total, json!(3));
        assert_eq!(admins, json!(1));
    }

    #[tokio::test]
    async fn test_internal_failure_is_masked() {
        let mut user_service = MockTestUserService::new();
        user_service
            .expect_list_users()
            .returning(|| Err(UserError::DatabaseError("pool timed out".to_string())));

        let dispatcher = dispatcher(MockTestAuthService::new(), user_service);

        let error = dispatcher
            .handle("find_all_users", json!({}))
            .await
            .unwrap_err();

        assert_eq!(error, RemoteError::internal());
    }

    #[tokio::test]
    async fn test_unknown_pattern_is_rejected() {
        let dispatcher = dispatcher(MockTestAuthService::new(), MockTestUserService::new());

        let error = dispatcher
            .handle("drop_users", json!({}))
            .await
            .unwrap_err();

        assert_eq!(error.error_kind, ErrorKind::ValidationError);
        assert_eq!(error.message, "No handler for pattern: drop_users");
    }
}
