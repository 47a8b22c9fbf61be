use protocol::AuthResult;
use protocol::UserView;
use rpc::RemoteError;

use crate::domain::auth::models::Authenticated;
use crate::domain::user::models::User;
use crate::user::errors::UserError;

pub mod auth;
pub mod users;

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            roles: user.roles,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<Authenticated> for AuthResult {
    fn from(authenticated: Authenticated) -> Self {
        Self {
            token: authenticated.token,
            user: authenticated.user.into(),
        }
    }
}

impl From<UserError> for RemoteError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::InvalidUserId(_)
            | UserError::InvalidUsername(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidPassword(_) => RemoteError::validation(error.to_string()),
            UserError::NotFound(_) => RemoteError::not_found(error.to_string()),
            UserError::UsernameAlreadyExists(_) | UserError::EmailAlreadyExists(_) => {
                RemoteError::conflict(error.to_string())
            }
            UserError::InvalidCredentials => RemoteError::unauthorized(error.to_string()),
            UserError::Password(_)
            | UserError::Token(_)
            | UserError::DatabaseError(_)
            | UserError::Unknown(_) => {
                tracing::error!(error = %error, "Internal failure while handling request");
                RemoteError::internal()
            }
        }
    }
}
