use auth::Identity;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use protocol::DeleteUserResponse;
use protocol::Password;
use serde::Deserialize;

use super::auth::UserResponseData;
use super::ApiError;
use super::ApiJson;
use super::ApiSuccess;
use crate::domain::access;
use crate::domain::identity::IdentityClient;
use crate::inbound::http::router::AppState;
use crate::inbound::http::validation;

pub async fn list_users<IC: IdentityClient>(
    State(state): State<AppState<IC>>,
) -> Result<ApiSuccess<Vec<UserResponseData>>, ApiError> {
    state
        .users_service
        .list_users()
        .await
        .map_err(ApiError::from)
        .map(|users| {
            ApiSuccess::new(
                StatusCode::OK,
                users.iter().map(UserResponseData::from).collect(),
            )
        })
}

pub async fn get_user<IC: IdentityClient>(
    State(state): State<AppState<IC>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    access::require_self_or_admin(&identity, &id)?;

    state
        .users_service
        .get_user(&id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

pub async fn update_user<IC: IdentityClient>(
    State(state): State<AppState<IC>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateUserRequestBody>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    access::require_self_or_admin(&identity, &id)?;
    body.validate()?;

    state
        .users_service
        .update_user(&id, body.username, body.email)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

pub async fn update_password<IC: IdentityClient>(
    State(state): State<AppState<IC>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdatePasswordRequestBody>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    access::require_self_or_admin(&identity, &id)?;
    validation::min_length(
        "newPassword",
        body.new_password.expose(),
        validation::PASSWORD_MIN_LENGTH,
    )?;

    state
        .users_service
        .update_password(&id, body.new_password)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

pub async fn delete_user<IC: IdentityClient>(
    State(state): State<AppState<IC>>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<DeleteUserResponse>, ApiError> {
    state
        .users_service
        .delete_user(&id)
        .await
        .map_err(ApiError::from)
        .map(|response| ApiSuccess::new(StatusCode::OK, response))
}

/// HTTP request body for a partial profile update (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateUserRequestBody {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl UpdateUserRequestBody {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(username) = &self.username {
            validation::not_empty("username", username)?;
        }
        if let Some(email) = &self.email {
            validation::email(email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequestBody {
    new_password: Password,
}
