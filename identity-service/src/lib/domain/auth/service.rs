use std::sync::Arc;

use async_trait::async_trait;
use auth::Role;
use auth::TokenService;

use crate::domain::auth::models::AdminBootstrap;
use crate::domain::auth::models::Authenticated;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::User;
use crate::user::errors::UserError;
use crate::user::ports::CredentialHasher;
use crate::user::ports::UserRepository;

/// Domain service for registration, credential validation and token issuing.
///
/// Holds no state between calls besides its collaborators.
pub struct AuthService<UR, CH>
where
    UR: UserRepository,
    CH: CredentialHasher,
{
    repository: Arc<UR>,
    hasher: Arc<CH>,
    tokens: Arc<TokenService>,
}

impl<UR, CH> AuthService<UR, CH>
where
    UR: UserRepository,
    CH: CredentialHasher,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `hasher` - Password hashing implementation
    /// * `tokens` - Token signer built from a validated secret
    pub fn new(repository: Arc<UR>, hasher: Arc<CH>, tokens: Arc<TokenService>) -> Self {
        Self {
            repository,
            hasher,
            tokens,
        }
    }

    /// Create the configured administrator unless an account with that email exists.
    ///
    /// An existing account is left untouched, whatever its roles.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username belongs to another account
    /// * `Password` / `DatabaseError` - Infrastructure failure
    pub async fn bootstrap_admin(
        &self,
        command: RegisterCommand,
    ) -> Result<AdminBootstrap, UserError> {
        if let Some(existing) = self
            .repository
            .find_by_email(command.email.as_str())
            .await?
        {
            return Ok(AdminBootstrap::AlreadyPresent(existing));
        }

        let admin = self
            .create_account(command, vec![Role::User, Role::Admin])
            .await?;
        Ok(AdminBootstrap::Created(admin))
    }

    async fn create_account(
        &self,
        command: RegisterCommand,
        roles: Vec<Role>,
    ) -> Result<User, UserError> {
        if self.repository.exists_by_email(&command.email).await? {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }
        if self.repository.exists_by_username(&command.username).await? {
            return Err(UserError::UsernameAlreadyExists(
                command.username.to_string(),
            ));
        }

        let password_hash = self.hasher.hash(command.password.expose()).await?;
        let user = User::new(command.username, command.email, password_hash, roles);

        // The store's unique constraints settle races the checks above cannot see.
        self.repository.create(user).await
    }

    fn authenticated(&self, user: User) -> Result<Authenticated, UserError> {
        let token = self
            .tokens
            .issue(&user.identity())
            .map_err(|e| UserError::Token(e.to_string()))?;
        Ok(Authenticated { token, user })
    }
}

#[async_trait]
impl<UR, CH> AuthServicePort for AuthService<UR, CH>
where
    UR: UserRepository,
    CH: CredentialHasher,
{
    async fn register(&self, command: RegisterCommand) -> Result<Authenticated, UserError> {
        let user = self.create_account(command, Role::DEFAULT.to_vec()).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        self.authenticated(user)
    }

    async fn validate_user(&self, credentials: Credentials) -> Result<Authenticated, UserError> {
        let user = match self.repository.find_by_email(&credentials.email).await? {
            Some(user) => user,
            None => {
                tracing::warn!("Credential check failed: unknown email");
                return Err(UserError::InvalidCredentials);
            }
        };

        if !self
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .await?
        {
            tracing::warn!(user_id = %user.id, "Credential check failed: password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        tracing::debug!(user_id = %user.id, "Credentials validated");
        self.authenticated(user)
    }
}

#[cfg(test)]
mod tests {
    use auth::SigningSecret;
    use chrono::Duration;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::NewPassword;
    use crate::domain::user::models::UpdateUserCommand;
    use crate::domain::user::models::UserId;
    use crate::domain::user::models::Username;
    use crate::user::errors::PasswordError;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update_profile(&self, id: &UserId, changes: UpdateUserCommand) -> Result<User, UserError>;
            async fn update_password_hash(&self, id: &UserId, password_hash: String) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
            async fn count(&self) -> Result<u64, UserError>;
            async fn count_by_role(&self, role: Role) -> Result<u64, UserError>;
            async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;
            async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError>;
        }
    }

    mock! {
        pub TestCredentialHasher {}

        #[async_trait]
        impl CredentialHasher for TestCredentialHasher {
            async fn hash(&self, password: &str) -> Result<String, PasswordError>;
            async fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordError>;
        }
    }

    const SECRET: &str = "k8Jv2mQx9Lr4Tz7Wc1Nf6Hb3Yp5Gd0Se";

    fn token_service() -> Arc<TokenService> {
        let secret = SigningSecret::new(SECRET).unwrap();
        Arc::new(TokenService::new(&secret, Duration::hours(1)))
    }

    fn register_command(email: &str, username: &str) -> RegisterCommand {
        RegisterCommand::new(
            Username::new(username.to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            NewPassword::new("Secret123!".to_string()).unwrap(),
        )
    }

    fn stored_user(email: &str) -> User {
        User::new(
            Username::new("alice".to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            "$argon2id$stored".to_string(),
            vec![Role::User],
        )
    }

    #[tokio::test]
    async fn test_register_success_issues_verifiable_token() {
        let mut repository = MockTestUserRepository::new();
        let mut hasher = MockTestCredentialHasher::new();

        repository
            .expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(false));
        repository
            .expect_exists_by_username()
            .times(1)
            .returning(|_| Ok(false));
        hasher
            .expect_hash()
            .withf(|password| password == "Secret123!")
            .times(1)
            .returning(|_| Ok("$argon2id$digest".to_string()));
        repository
            .expect_create()
            .withf(|user| {
                user.email.as_str() == "a@x.com"
                    && user.password_hash == "$argon2id$digest"
                    && user.roles == vec![Role::User]
            })
            .times(1)
            .returning(|user| Ok(user));

        let tokens = token_service();
        let service = AuthService::new(
            Arc::new(repository),
            Arc::new(hasher),
            Arc::clone(&tokens),
        );

        let result = service
            .register(register_command("a@x.com", "alice"))
            .await
            .unwrap();

        let identity = tokens.verify(&result.token).unwrap();
        assert_eq!(identity.user_id, result.user.id.to_string());
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.roles, vec![Role::User]);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_checked_before_username() {
        let mut repository = MockTestUserRepository::new();
        let mut hasher = MockTestCredentialHasher::new();

        repository
            .expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(true));
        repository.expect_exists_by_username().times(0);
        hasher.expect_hash().times(0);
        repository.expect_create().times(0);

        let service = AuthService::new(Arc::new(repository), Arc::new(hasher), token_service());

        let result = service.register(register_command("a@x.com", "bob")).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::EmailAlreadyExists(email) if email == "a@x.com"
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let mut repository = MockTestUserRepository::new();
        let mut hasher = MockTestCredentialHasher::new();

        repository
            .expect_exists_by_email()
            .returning(|_| Ok(false));
        repository
            .expect_exists_by_username()
            .times(1)
            .returning(|_| Ok(true));
        hasher.expect_hash().times(0);
        repository.expect_create().times(0);

        let service = AuthService::new(Arc::new(repository), Arc::new(hasher), token_service());

        let result = service.register(register_command("b@x.com", "alice")).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::UsernameAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_register_race_lost_at_storage_is_conflict() {
        let mut repository = MockTestUserRepository::new();
        let mut hasher = MockTestCredentialHasher::new();

        repository
            .expect_exists_by_email()
            .returning(|_| Ok(false));
        repository
            .expect_exists_by_username()
            .returning(|_| Ok(false));
        hasher
            .expect_hash()
            .returning(|_| Ok("$argon2id$digest".to_string()));
        repository
            .expect_create()
            .times(1)
            .returning(|user| Err(UserError::EmailAlreadyExists(user.email.to_string())));

        let service = AuthService::new(Arc::new(repository), Arc::new(hasher), token_service());

        let result = service.register(register_command("a@x.com", "alice")).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_validate_user_success() {
        let mut repository = MockTestUserRepository::new();
        let mut hasher = MockTestCredentialHasher::new();

        let user = stored_user("a@x.com");
        let user_id = user.id;
        repository
            .expect_find_by_email()
            .withf(|email| email == "a@x.com")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        hasher
            .expect_verify()
            .withf(|password, digest| password == "Secret123!" && digest == "$argon2id$stored")
            .times(1)
            .returning(|_, _| Ok(true));

        let service = AuthService::new(Arc::new(repository), Arc::new(hasher), token_service());

        let result = service
            .validate_user(Credentials::new("a@x.com", "Secret123!"))
            .await
            .unwrap();

        assert_eq!(result.user.id, user_id);
        assert!(!result.token.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_fail_identically() {
        let mut repository = MockTestUserRepository::new();
        let mut hasher = MockTestCredentialHasher::new();

        let user = stored_user("a@x.com");
        repository
            .expect_find_by_email()
            .returning(move |email| {
                if email == "a@x.com" {
                    Ok(Some(user.clone()))
                } else {
                    Ok(None)
                }
            });
        hasher.expect_verify().returning(|_, _| Ok(false));

        let service = AuthService::new(Arc::new(repository), Arc::new(hasher), token_service());

        let unknown = service
            .validate_user(Credentials::new("nobody@x.com", "Secret123!"))
            .await
            .unwrap_err();
        let mismatch = service
            .login(Credentials::new("a@x.com", "WrongPass"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, UserError::InvalidCredentials));
        assert!(matches!(mismatch, UserError::InvalidCredentials));
        assert_eq!(unknown.to_string(), mismatch.to_string());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_creates_admin_once() {
        let mut repository = MockTestUserRepository::new();
        let mut hasher = MockTestCredentialHasher::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_exists_by_email()
            .returning(|_| Ok(false));
        repository
            .expect_exists_by_username()
            .returning(|_| Ok(false));
        hasher
            .expect_hash()
            .returning(|_| Ok("$argon2id$digest".to_string()));
        repository
            .expect_create()
            .withf(|user| user.roles == vec![Role::User, Role::Admin])
            .times(1)
            .returning(|user| Ok(user));

        let service = AuthService::new(Arc::new(repository), Arc::new(hasher), token_service());

        let outcome = service
            .bootstrap_admin(register_command("root@x.com", "root"))
            .await
            .unwrap();
        assert!(matches!(outcome, AdminBootstrap::Created(user) if user.has_role(Role::Admin)));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_leaves_existing_account() {
        let mut repository = MockTestUserRepository::new();
        let hasher = MockTestCredentialHasher::new();

        let existing = stored_user("root@x.com");
        repository
            .expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        repository.expect_create().times(0);

        let service = AuthService::new(Arc::new(repository), Arc::new(hasher), token_service());

        let outcome = service
            .bootstrap_admin(register_command("root@x.com", "root"))
            .await
            .unwrap();
        assert!(matches!(outcome, AdminBootstrap::AlreadyPresent(_)));
    }
}
