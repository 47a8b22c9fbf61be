use std::fmt;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewPassword;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;

/// Command to register a new account with validated fields.
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: NewPassword,
}

impl RegisterCommand {
    pub fn new(username: Username, email: EmailAddress, password: NewPassword) -> Self {
        Self {
            username,
            email,
            password,
        }
    }
}

/// Transient email + plaintext password pair, alive for one call.
///
/// The email is not validated: an unparseable email must fail exactly like an unknown one.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Successful authentication: a signed token and the account it was issued for.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub token: String,
    pub user: User,
}

/// Result of the startup administrator bootstrap.
#[derive(Debug, Clone)]
pub enum AdminBootstrap {
    Created(User),
    AlreadyPresent(User),
}
