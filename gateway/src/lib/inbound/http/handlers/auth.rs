use auth::Role;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::DateTime;
use chrono::Utc;
use protocol::AuthResult;
use protocol::LoginRequest;
use protocol::Password;
use protocol::RegisterRequest;
use protocol::UserView;
use protocol::ValidateUserRequest;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::domain::identity::IdentityClient;
use crate::inbound::http::router::AppState;
use crate::inbound::http::validation;

pub async fn register<IC: IdentityClient>(
    State(state): State<AppState<IC>>,
    ApiJson(body): ApiJson<RegisterRequestBody>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    state
        .auth_service
        .register(body.try_into_request()?)
        .await
        .map_err(ApiError::from)
        .map(|ref result| ApiSuccess::new(StatusCode::CREATED, result.into()))
}

pub async fn login<IC: IdentityClient>(
    State(state): State<AppState<IC>>,
    ApiJson(body): ApiJson<CredentialsRequestBody>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let (email, password) = body.try_into_parts()?;
    state
        .auth_service
        .login(LoginRequest { email, password })
        .await
        .map_err(ApiError::from)
        .map(|ref result| ApiSuccess::new(StatusCode::OK, result.into()))
}

pub async fn validate_user<IC: IdentityClient>(
    State(state): State<AppState<IC>>,
    ApiJson(body): ApiJson<CredentialsRequestBody>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let (email, password) = body.try_into_parts()?;
    state
        .auth_service
        .validate_user(ValidateUserRequest { email, password })
        .await
        .map_err(ApiError::from)
        .map(|ref result| ApiSuccess::new(StatusCode::OK, result.into()))
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequestBody {
    email: String,
    username: String,
    password: Password,
}

impl RegisterRequestBody {
    fn try_into_request(self) -> Result<RegisterRequest, ApiError> {
        validation::email(&self.email)?;
        validation::not_empty("username", &self.username)?;
        validation::strong_password(self.password.expose())?;

        Ok(RegisterRequest {
            email: self.email,
            username: self.username,
            password: self.password,
        })
    }
}

/// HTTP request body for login and credential validation (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialsRequestBody {
    email: String,
    password: Password,
}

impl CredentialsRequestBody {
    fn try_into_parts(self) -> Result<(String, Password), ApiError> {
        validation::email(&self.email)?;
        validation::min_length(
            "password",
            self.password.expose(),
            validation::PASSWORD_MIN_LENGTH,
        )?;
        Ok((self.email, self.password))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponseData {
    pub token: String,
    pub user: UserResponseData,
}

impl From<&AuthResult> for AuthResponseData {
    fn from(result: &AuthResult) -> Self {
        Self {
            token: result.token.clone(),
            user: (&result.user).into(),
        }
    }
}

/// Public user representation. There is no password field to leak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserView> for UserResponseData {
    fn from(user: &UserView) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
