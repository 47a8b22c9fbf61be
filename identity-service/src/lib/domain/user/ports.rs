use async_trait::async_trait;
use auth::Role;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewPassword;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::PasswordError;
use crate::user::errors::UserError;

/// Port for user management operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Retrieve every registered user.
    ///
    /// # Returns
    /// All users, newest first
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Arguments
    /// * `id` - User ID
    ///
    /// # Returns
    /// User entity
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Update username and/or email of an existing user.
    ///
    /// # Arguments
    /// * `id` - User ID to update
    /// * `command` - Command with optional username and email fields
    ///
    /// # Returns
    /// Updated user entity
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username belongs to another user
    /// * `EmailAlreadyExists` - New email belongs to another user
    /// * `DatabaseError` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Replace the password of an existing user.
    ///
    /// # Arguments
    /// * `id` - User ID to update
    /// * `password` - New plaintext password, hashed before storage
    ///
    /// # Returns
    /// Updated user entity
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `Password` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn update_password(&self, id: &UserId, password: NewPassword)
        -> Result<User, UserError>;

    /// Delete existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;

    /// Count every registered user.
    async fn count_users(&self) -> Result<u64, UserError>;

    /// Count users holding `role`.
    async fn count_users_by_role(&self, role: Role) -> Result<u64, UserError>;
}

/// Persistence operations for user aggregate.
///
/// Implementations are the authoritative arbiter of email and username uniqueness.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Arguments
    /// * `user` - User entity to create
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address, compared exactly.
    ///
    /// # Arguments
    /// * `email` - Email address string, not validated
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve all users from storage, newest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Set only the fields present in `changes` and bump `updated_at`.
    ///
    /// Fields absent from `changes` are left as currently stored, so concurrent updates to
    /// other fields are never overwritten.
    ///
    /// # Arguments
    /// * `id` - User ID to update
    /// * `changes` - Optional new username and email
    ///
    /// # Returns
    /// User entity as stored after the update
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_profile(
        &self,
        id: &UserId,
        changes: UpdateUserCommand,
    ) -> Result<User, UserError>;

    /// Replace only the stored password digest and bump `updated_at`.
    ///
    /// # Returns
    /// User entity as stored after the update
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: String,
    ) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;

    /// Number of stored users.
    async fn count(&self) -> Result<u64, UserError>;

    /// Number of stored users holding `role`.
    async fn count_by_role(&self, role: Role) -> Result<u64, UserError>;

    /// Whether an account with exactly this email exists.
    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;

    /// Whether an account with exactly this username exists.
    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError>;
}

/// One-way password hashing.
#[async_trait]
pub trait CredentialHasher: Send + Sync + 'static {
    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Self-describing digest
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing primitive failed
    async fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Check a plaintext password against a stored digest.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    /// * `digest` - Digest previously returned by `hash`
    ///
    /// # Returns
    /// `true` on match, `false` on mismatch
    ///
    /// # Errors
    /// * `VerificationFailed` - Digest is unreadable
    async fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordError>;
}
