use std::sync::Arc;
use std::time::Duration;

use auth::TokenService;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::auth::login;
use super::handlers::auth::register;
use super::handlers::auth::validate_user;
use super::handlers::profile::admin_dashboard;
use super::handlers::profile::profile;
use super::handlers::users::delete_user;
use super::handlers::users::get_user;
use super::handlers::users::list_users;
use super::handlers::users::update_password;
use super::handlers::users::update_user;
use super::middleware::authenticate;
use super::middleware::require_admin;
use crate::domain::auth::AuthService;
use crate::domain::identity::IdentityClient;
use crate::domain::profile::ProfileService;
use crate::domain::users::UsersService;

pub struct AppState<IC>
where
    IC: IdentityClient,
{
    pub auth_service: Arc<AuthService<IC>>,
    pub profile_service: Arc<ProfileService<IC>>,
    pub users_service: Arc<UsersService<IC>>,
    pub tokens: Arc<TokenService>,
}

impl<IC> Clone for AppState<IC>
where
    IC: IdentityClient,
{
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            profile_service: Arc::clone(&self.profile_service),
            users_service: Arc::clone(&self.users_service),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<IC> AppState<IC>
where
    IC: IdentityClient,
{
    pub fn new(identity: Arc<IC>, tokens: Arc<TokenService>) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(Arc::clone(&identity))),
            profile_service: Arc::new(ProfileService::new(Arc::clone(&identity))),
            users_service: Arc::new(UsersService::new(identity)),
            tokens,
        }
    }
}

/// Build the gateway router.
///
/// `/auth/*` is public. Every other route runs `authenticate` first; ADMIN-only routes then
/// run `require_admin`. Self-or-ADMIN routes check ownership in the handler.
pub fn create_router<IC>(identity: Arc<IC>, tokens: Arc<TokenService>) -> Router
where
    IC: IdentityClient,
{
    let state = AppState::new(identity, tokens);

    let public_routes = Router::new()
        .route("/auth/register", post(register::<IC>))
        .route("/auth/login", post(login::<IC>))
        .route("/auth/validate_user", post(validate_user::<IC>));

    let protected_routes = Router::new()
        .route("/profile", get(profile))
        .route(
            "/profile/admin",
            get(admin_dashboard::<IC>).route_layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/users",
            get(list_users::<IC>).route_layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/users/:id",
            get(get_user::<IC>).patch(update_user::<IC>).merge(
                delete(delete_user::<IC>).route_layer(middleware::from_fn(require_admin)),
            ),
        )
        .route("/users/:id/password", patch(update_password::<IC>))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.tokens),
            authenticate,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
