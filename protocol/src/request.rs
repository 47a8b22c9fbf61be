use rpc::RemoteError;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::patterns;
use crate::requests::DeleteUserRequest;
use crate::requests::FindAllUsersRequest;
use crate::requests::FindUserByIdRequest;
use crate::requests::GetUserCountByRoleRequest;
use crate::requests::GetUserCountRequest;
use crate::requests::LoginRequest;
use crate::requests::RegisterRequest;
use crate::requests::UpdateUserPasswordRequest;
use crate::requests::UpdateUserRequest;
use crate::requests::ValidateUserRequest;

/// Every request the identity service understands, with its typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRequest {
    ValidateUser(ValidateUserRequest),
    Register(RegisterRequest),
    Login(LoginRequest),
    FindAllUsers(FindAllUsersRequest),
    FindUserById(FindUserByIdRequest),
    UpdateUser(UpdateUserRequest),
    UpdateUserPassword(UpdateUserPasswordRequest),
    DeleteUser(DeleteUserRequest),
    GetUserCount(GetUserCountRequest),
    GetUserCountByRole(GetUserCountByRoleRequest),
}

impl IdentityRequest {
    /// Decode a pattern name and raw payload into a typed request.
    ///
    /// A `null` payload is read as an empty object so payload-less patterns accept both.
    ///
    /// # Errors
    /// * `ValidationError` - Unknown pattern, or payload does not match the pattern's shape
    pub fn decode(pattern: &str, payload: Value) -> Result<Self, RemoteError> {
        let payload = match payload {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };

        match pattern {
            patterns::VALIDATE_USER | patterns::VALIDATE_USER_ALIAS => {
                parse(pattern, payload).map(Self::ValidateUser)
            }
            patterns::REGISTER => parse(pattern, payload).map(Self::Register),
            patterns::LOGIN => parse(pattern, payload).map(Self::Login),
            patterns::FIND_ALL_USERS => parse(pattern, payload).map(Self::FindAllUsers),
            patterns::FIND_USER_BY_ID => parse(pattern, payload).map(Self::FindUserById),
            patterns::UPDATE_USER => parse(pattern, payload).map(Self::UpdateUser),
            patterns::UPDATE_USER_PASSWORD => {
                parse(pattern, payload).map(Self::UpdateUserPassword)
            }
            patterns::DELETE_USER => parse(pattern, payload).map(Self::DeleteUser),
            patterns::GET_USER_COUNT => parse(pattern, payload).map(Self::GetUserCount),
            patterns::GET_USER_COUNT_BY_ROLE => {
                parse(pattern, payload).map(Self::GetUserCountByRole)
            }
            other => Err(RemoteError::validation(format!(
                "No handler for pattern: {}",
                other
            ))),
        }
    }

    /// Canonical pattern name of this request.
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::ValidateUser(_) => patterns::VALIDATE_USER,
            Self::Register(_) => patterns::REGISTER,
            Self::Login(_) => patterns::LOGIN,
            Self::FindAllUsers(_) => patterns::FIND_ALL_USERS,
            Self::FindUserById(_) => patterns::FIND_USER_BY_ID,
            Self::UpdateUser(_) => patterns::UPDATE_USER,
            Self::UpdateUserPassword(_) => patterns::UPDATE_USER_PASSWORD,
            Self::DeleteUser(_) => patterns::DELETE_USER,
            Self::GetUserCount(_) => patterns::GET_USER_COUNT,
            Self::GetUserCountByRole(_) => patterns::GET_USER_COUNT_BY_ROLE,
        }
    }
}

fn parse<T: DeserializeOwned>(pattern: &str, payload: Value) -> Result<T, RemoteError> {
    serde_json::from_value(payload).map_err(|e| {
        RemoteError::validation(format!("Invalid payload for {}: {}", pattern, e))
    })
}
