use std::fmt;

use auth::Role;
use rpc::Call;
use serde::Deserialize;
use serde::Serialize;

use crate::patterns;
use crate::responses::AuthResult;
use crate::responses::DeleteUserResponse;
use crate::responses::UserView;

/// Plaintext password in transit. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([redacted])")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateUserRequest {
    pub email: String,
    pub password: Password,
}

impl Call for ValidateUserRequest {
    const PATTERN: &'static str = patterns::VALIDATE_USER;
    type Response = AuthResult;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Password,
}

impl Call for LoginRequest {
    const PATTERN: &'static str = patterns::LOGIN;
    type Response = AuthResult;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: Password,
}

impl Call for RegisterRequest {
    const PATTERN: &'static str = patterns::REGISTER;
    type Response = AuthResult;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindAllUsersRequest {}

impl Call for FindAllUsersRequest {
    const PATTERN: &'static str = patterns::FIND_ALL_USERS;
    type Response = Vec<UserView>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindUserByIdRequest {
    pub id: String,
}

impl Call for FindUserByIdRequest {
    const PATTERN: &'static str = patterns::FIND_USER_BY_ID;
    type Response = UserView;
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Call for UpdateUserRequest {
    const PATTERN: &'static str = patterns::UPDATE_USER;
    type Response = UserView;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPasswordRequest {
    pub id: String,
    pub new_password: Password,
}

impl Call for UpdateUserPasswordRequest {
    const PATTERN: &'static str = patterns::UPDATE_USER_PASSWORD;
    type Response = UserView;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteUserRequest {
    pub id: String,
}

impl Call for DeleteUserRequest {
    const PATTERN: &'static str = patterns::DELETE_USER;
    type Response = DeleteUserResponse;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserCountRequest {}

impl Call for GetUserCountRequest {
    const PATTERN: &'static str = patterns::GET_USER_COUNT;
    type Response = u64;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetUserCountByRoleRequest {
    pub role: Role,
}

impl Call for GetUserCountByRoleRequest {
    const PATTERN: &'static str = patterns::GET_USER_COUNT_BY_ROLE;
    type Response = u64;
}
