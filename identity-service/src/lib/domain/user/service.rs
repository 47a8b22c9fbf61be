use std::sync::Arc;

use async_trait::async_trait;
use auth::Role;

use crate::domain::user::models::NewPassword;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::CredentialHasher;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user management.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR, CH>
where
    UR: UserRepository,
    CH: CredentialHasher,
{
    repository: Arc<UR>,
    hasher: Arc<CH>,
}

impl<UR, CH> UserService<UR, CH>
where
    UR: UserRepository,
    CH: CredentialHasher,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `hasher` - Password hashing implementation
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, hasher: Arc<CH>) -> Self {
        Self { repository, hasher }
    }

    async fn find_existing(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<UR, CH> UserServicePort for UserService<UR, CH>
where
    UR: UserRepository,
    CH: CredentialHasher,
{
    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.find_existing(id).await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let user = self.find_existing(id).await?;
        let mut changes = UpdateUserCommand::default();

        if let Some(new_email) = command.email {
            if new_email != user.email {
                if self.repository.exists_by_email(&new_email).await? {
                    return Err(UserError::EmailAlreadyExists(new_email.to_string()));
                }
                changes.email = Some(new_email);
            }
        }

        if let Some(new_username) = command.username {
            if new_username != user.username {
                if self.repository.exists_by_username(&new_username).await? {
                    return Err(UserError::UsernameAlreadyExists(new_username.to_string()));
                }
                changes.username = Some(new_username);
            }
        }

        let updated_user = self.repository.update_profile(id, changes).await?;

        tracing::info!(user_id = %updated_user.id, "User profile updated");
        Ok(updated_user)
    }

    async fn update_password(
        &self,
        id: &UserId,
        password: NewPassword,
    ) -> Result<User, UserError> {
        self.find_existing(id).await?;

        let password_hash = self.hasher.hash(password.expose()).await?;
        let updated_user = self
            .repository
            .update_password_hash(id, password_hash)
            .await?;

        tracing::info!(user_id = %updated_user.id, "User password updated");
        Ok(updated_user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn count_users(&self) -> Result<u64, UserError> {
        self.repository.count().await
    }

    async fn count_users_by_role(&self, role: Role) -> Result<u64, UserError> {
        self.repository.count_by_role(role).await
    }
}
