//! API layer - HTTP handlers and routing
//!
//! All endpoints live under `/api/v1`. Write operations sit behind the
//! `require_auth` middleware; read operations run with `optional_auth` so an
//! authenticated viewer sees their own unpublished posts.

pub mod auth;
pub mod comments;
pub mod middleware;
pub mod posts;
pub mod responses;
pub mod tags;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .route("/posts", post(posts::create_post))
        .route("/posts/{slug}", axum::routing::put(posts::update_post))
        .route("/posts/{slug}", delete(posts::delete_post))
        .route("/tags", post(tags::create_tag))
        .route("/tags/{value}", delete(tags::delete_tag))
        .route("/comments", post(comments::create_comment))
        .route("/comments/{id}", delete(comments::delete_comment))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes (viewer identity is picked up when a token is present)
    Router::new()
        .nest("/posts", posts::public_router())
        .nest("/tags", tags::public_router())
        .nest("/users", users::public_router())
        .nest("/auth", auth::public_router())
        .nest("/jwt", auth::jwt_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ))
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000")),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
