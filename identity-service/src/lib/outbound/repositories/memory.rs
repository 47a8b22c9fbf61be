use std::collections::HashMap;

use async_trait::async_trait;
use auth::Role;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Process-local user store.
///
/// Uniqueness of email and username is checked and enforced under the same write lock as the
/// insert, so concurrent duplicate registrations cannot both succeed.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// First unique-key collision between `candidate` and any other stored user.
fn conflict(users: &HashMap<UserId, User>, candidate: &User) -> Option<UserError> {
    let others = users.values().filter(|user| user.id != candidate.id);

    for other in others {
        if other.email == candidate.email {
            return Some(UserError::EmailAlreadyExists(candidate.email.to_string()));
        }
        if other.username == candidate.username {
            return Some(UserError::UsernameAlreadyExists(
                candidate.username.to_string(),
            ));
        }
    }
    None
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if let Some(error) = conflict(&users, &user) {
            return Err(error);
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email.as_str() == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| &user.username == username)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update_profile(
        &self,
        id: &UserId,
        changes: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        let mut user = users
            .get(id)
            .cloned()
            .ok_or(UserError::NotFound(id.to_string()))?;
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(error) = conflict(&users, &user) {
            return Err(error);
        }

        user.touch();
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: String,
    ) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        let user = users
            .get_mut(id)
            .ok_or(UserError::NotFound(id.to_string()))?;
        user.password_hash = password_hash;
        user.touch();
        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn count(&self) -> Result<u64, UserError> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|user| user.has_role(role))
            .count() as u64)
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|user| &user.email == email))
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|user| &user.username == username))
    }
}
