use std::sync::Arc;

use auth::Identity;
use auth::Role;
use auth::TokenError;
use auth::TokenService;
use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::access;

pub const MISSING_AUTHORIZATION: &str = "Missing Authorization header";
pub const INVALID_TOKEN: &str = "Invalid or expired token";
pub const INVALID_TOKEN_PAYLOAD: &str = "Invalid token payload";

/// Verifies the bearer token and stores the caller's [`Identity`] in request extensions.
///
/// Rejects with 401 before the handler runs when the token is absent, malformed, expired,
/// signed with another key, or missing identity claims.
pub async fn authenticate(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let identity = tokens.verify(token).map_err(|e| {
        tracing::warn!(error = %e, "JWT validation failed");
        match e {
            TokenError::InvalidPayload(_) => {
                ApiError::Unauthorized(INVALID_TOKEN_PAYLOAD.to_string())
            }
            TokenError::Unauthorized(_) | TokenError::Signing(_) => {
                ApiError::Unauthorized(INVALID_TOKEN.to_string())
            }
        }
    })?;

    tracing::debug!(user_id = %identity.user_id, "Request authenticated");
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Lets the request through only when the caller holds the ADMIN role.
///
/// Must run after [`authenticate`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .ok_or_else(|| ApiError::Unauthorized(MISSING_AUTHORIZATION.to_string()))?;

    access::require_any_role(identity, &[Role::Admin]).inspect_err(|_| {
        tracing::warn!(
            user_id = %identity.user_id,
            uri = %req.uri(),
            "Role check failed"
        );
    })?;

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized(MISSING_AUTHORIZATION.to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    // Auth schemes are case-insensitive.
    match auth_str.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("Bearer") => Ok(token.trim_start()),
        _ => Err(ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )),
    }
}
