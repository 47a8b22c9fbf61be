use auth::Identity;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::IdentityClient;
use crate::domain::profile::AdminSummary;
use crate::inbound::http::router::AppState;

pub async fn profile(Extension(identity): Extension<Identity>) -> ApiSuccess<ProfileResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        ProfileResponseData {
            message: "This is a protected route".to_string(),
            user: identity,
        },
    )
}

pub async fn admin_dashboard<IC: IdentityClient>(
    State(state): State<AppState<IC>>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiSuccess<AdminResponseData>, ApiError> {
    state
        .profile_service
        .admin_summary()
        .await
        .map_err(ApiError::from)
        .map(|admin_data| {
            ApiSuccess::new(
                StatusCode::OK,
                AdminResponseData {
                    message: "This is an admin-only route".to_string(),
                    user_id: identity.user_id,
                    admin_data,
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileResponseData {
    pub message: String,
    pub user: Identity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponseData {
    pub message: String,
    pub user_id: String,
    pub admin_data: AdminSummary,
}
