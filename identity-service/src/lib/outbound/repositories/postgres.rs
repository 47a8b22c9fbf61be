use async_trait::async_trait;
use auth::Role;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let roles = row
            .roles
            .iter()
            .map(|role| role.parse::<Role>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(User {
            id: UserId(row.id),
            username: Username::new(row.username)?,
            email: EmailAddress::new(row.email)?,
            password_hash: row.password_hash,
            roles: Role::normalize(roles),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn role_names(user: &User) -> Vec<String> {
    user.roles.iter().map(|role| role.as_str().to_string()).collect()
}

/// Conflict error for a violated unique constraint, if it is one of ours.
fn unique_conflict(constraint: Option<&str>, username: &str, email: &str) -> Option<UserError> {
    match constraint {
        Some(USERNAME_CONSTRAINT) => Some(UserError::UsernameAlreadyExists(username.to_string())),
        Some(EMAIL_CONSTRAINT) => Some(UserError::EmailAlreadyExists(email.to_string())),
        _ => None,
    }
}

/// Map unique-constraint violations to the matching conflict error.
fn write_error(e: sqlx::Error, username: &str, email: &str) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if let Some(conflict) = unique_conflict(db_err.constraint(), username, email) {
                return conflict;
            }
        }
    }
    UserError::DatabaseError(e.to_string())
}

fn read_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

fn to_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, roles, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(role_names(&user))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, user.username.as_str(), user.email.as_str()))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, roles, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error)?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, roles, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error)?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, roles, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error)?
        .map(User::try_from)
        .transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, roles, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(read_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_profile(
        &self,
        id: &UserId,
        changes: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let username = changes.username.as_ref().map(Username::as_str);
        let email = changes.email.as_ref().map(EmailAddress::as_str);

        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                updated_at = GREATEST(updated_at, $4)
            WHERE id = $1
            RETURNING id, username, email, password_hash, roles, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(username)
        .bind(email)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, username.unwrap_or_default(), email.unwrap_or_default()))?
        .map(User::try_from)
        .transpose()?
        .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: String,
    ) -> Result<User, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = GREATEST(updated_at, $3)
            WHERE id = $1
            RETURNING id, username, email, password_hash, roles, created_at, updated_at
            "#,
        )
        .bind(id.0)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(read_error)?
        .map(User::try_from)
        .transpose()?
        .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(read_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn count(&self) -> Result<u64, UserError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map(to_count)
            .map_err(read_error)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, UserError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE $1 = ANY(roles)")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map(to_count)
            .map_err(read_error)
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(read_error)
    }

    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(read_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(roles: Vec<&str>) -> UserRow {
        let now = Utc::now();
        UserRow {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$digest".to_string(),
            roles: roles.into_iter().map(str::to_string).collect(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_username_constraint_is_username_conflict() {
        let conflict = unique_conflict(Some("users_username_key"), "alice", "a@x.com");
        assert!(matches!(
            conflict,
            Some(UserError::UsernameAlreadyExists(username)) if username == "alice"
        ));
    }

    #[test]
    fn test_email_constraint_is_email_conflict() {
        let conflict = unique_conflict(Some("users_email_key"), "alice", "a@x.com");
        assert!(matches!(
            conflict,
            Some(UserError::EmailAlreadyExists(email)) if email == "a@x.com"
        ));
    }

    #[test]
    fn test_other_constraints_are_not_conflicts() {
        assert!(unique_conflict(Some("users_pkey"), "alice", "a@x.com").is_none());
        assert!(unique_conflict(None, "alice", "a@x.com").is_none());
    }

    #[test]
    fn test_non_database_error_is_database_error() {
        let error = write_error(sqlx::Error::RowNotFound, "alice", "a@x.com");
        assert!(matches!(error, UserError::DatabaseError(_)));
    }

    #[test]
    fn test_row_roles_are_normalized() {
        let user = User::try_from(row(vec!["ADMIN", "USER", "ADMIN"])).unwrap();
        assert_eq!(user.roles, Role::normalize(vec![Role::Admin, Role::User]));

        let user = User::try_from(row(vec![])).unwrap();
        assert_eq!(user.roles, vec![Role::User]);
    }

    #[test]
    fn test_unknown_role_in_row_is_database_error() {
        let result = User::try_from(row(vec!["ROOT"]));
        assert!(matches!(result, Err(UserError::DatabaseError(_))));
    }
}
