use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use rpc::ErrorKind;
use rpc::RemoteError;
use rpc::RpcError;
use serde::Serialize;

use crate::domain::access::AccessError;

pub mod auth;
pub mod profile;
pub mod users;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Detail is logged, never returned.
    InternalServerError(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    ServiceUnavailable(String),
    Timeout(String),
}

impl ApiError {
    pub const INTERNAL_MESSAGE: &'static str = "Internal server error";

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) | ApiError::Timeout(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    /// Error kind name sent to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InternalServerError(_) => ErrorKind::Internal.as_str(),
            ApiError::BadRequest(_) => ErrorKind::ValidationError.as_str(),
            ApiError::Unauthorized(_) => ErrorKind::Unauthorized.as_str(),
            ApiError::Forbidden(_) => ErrorKind::Forbidden.as_str(),
            ApiError::NotFound(_) => ErrorKind::NotFound.as_str(),
            ApiError::Conflict(_) => ErrorKind::Conflict.as_str(),
            ApiError::ServiceUnavailable(_) => "ServiceUnavailable",
            ApiError::Timeout(_) => "Timeout",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        Self::Forbidden(err.to_string())
    }
}

impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        match err.error_kind {
            ErrorKind::ValidationError => ApiError::BadRequest(err.message),
            ErrorKind::Unauthorized => ApiError::Unauthorized(err.message),
            ErrorKind::Forbidden => ApiError::Forbidden(err.message),
            ErrorKind::NotFound => ApiError::NotFound(err.message),
            ErrorKind::Conflict => ApiError::Conflict(err.message),
            ErrorKind::Internal => ApiError::InternalServerError(err.message),
        }
    }
}

impl From<RpcError> for ApiError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Remote(remote) => remote.into(),
            RpcError::ServiceUnavailable(detail) => {
                tracing::warn!(error = %detail, "Identity service unavailable");
                ApiError::ServiceUnavailable("Identity service unavailable".to_string())
            }
            RpcError::Timeout(after) => {
                tracing::warn!(timeout_ms = after.as_millis(), "Identity service timed out");
                ApiError::Timeout("Identity service did not respond in time".to_string())
            }
            RpcError::Encode(_) | RpcError::Decode(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let kind = self.kind();
        let message = match self {
            ApiError::InternalServerError(detail) => {
                tracing::error!(error = %detail, "Request failed with internal error");
                Self::INTERNAL_MESSAGE.to_string()
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Timeout(msg) => msg,
        };

        (
            status,
            Json(ApiResponseBody::new_error(status, message, kind)),
        )
            .into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String, error: &str) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData {
                message,
                error: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
    pub error: String,
}
