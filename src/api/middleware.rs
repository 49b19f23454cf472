//! API middleware
//!
//! Application state, the JSON error envelope, and bearer-token
//! authentication. Two token kinds are accepted: opaque session tokens and
//! JWT access tokens; a token containing '.' is treated as a JWT.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::repositories::UserRepository;
use crate::models::User;
use crate::services::{
    CommentService, CommentServiceError, JwtService, PostService, PostServiceError,
    ProfileService, ProfileServiceError, TagService, TagServiceError, UserService,
    UserServiceError,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub post_service: Arc<PostService>,
    pub tag_service: Arc<TagService>,
    pub comment_service: Arc<CommentService>,
    pub profile_service: Arc<ProfileService>,
    pub jwt_service: Arc<JwtService>,
    pub user_repo: Arc<dyn UserRepository>,
}

impl AppState {
    /// Wire every service onto a database pool.
    pub fn new(pool: sqlx::SqlitePool, config: &crate::config::Config) -> Self {
        use crate::db::repositories::{
            SqlxCommentRepository, SqlxPostRepository, SqlxProfileRepository,
            SqlxSessionRepository, SqlxTagRepository, SqlxUserRepository,
        };

        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let post_repo = SqlxPostRepository::boxed(pool.clone());
        let tag_repo = SqlxTagRepository::boxed(pool.clone());

        Self {
            user_service: Arc::new(UserService::with_session_ttl(
                user_repo.clone(),
                SqlxSessionRepository::boxed(pool.clone()),
                config.auth.session_ttl_days,
            )),
            post_service: Arc::new(PostService::new(
                post_repo.clone(),
                tag_repo.clone(),
                user_repo.clone(),
            )),
            tag_service: Arc::new(TagService::new(tag_repo)),
            comment_service: Arc::new(CommentService::new(
                SqlxCommentRepository::boxed(pool.clone()),
                post_repo,
            )),
            profile_service: Arc::new(ProfileService::new(
                SqlxProfileRepository::boxed(pool),
                user_repo.clone(),
            )),
            jwt_service: Arc::new(JwtService::new(
                &config.auth.jwt_secret,
                config.auth.access_ttl_minutes,
                config.auth.refresh_ttl_days,
            )),
            user_repo,
        }
    }
}

/// Authenticated user extracted from request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Viewer identity for endpoints that work with or without authentication
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|au| au.0.clone()),
        ))
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(message = %self.error.message, "Internal error");
        }

        (status, Json(self)).into_response()
    }
}

impl From<PostServiceError> for ApiError {
    fn from(err: PostServiceError) -> Self {
        match err {
            PostServiceError::NotFound(_) => ApiError::not_found(err.to_string()),
            PostServiceError::ValidationError(_) => ApiError::validation_error(err.to_string()),
            PostServiceError::Forbidden(_) => ApiError::forbidden(err.to_string()),
            PostServiceError::DuplicateSlug(_) => ApiError::conflict(err.to_string()),
            PostServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<TagServiceError> for ApiError {
    fn from(err: TagServiceError) -> Self {
        match err {
            TagServiceError::NotFound(_) => ApiError::not_found(err.to_string()),
            TagServiceError::ValidationError(_) => ApiError::validation_error(err.to_string()),
            TagServiceError::DuplicateValue(_) => ApiError::conflict(err.to_string()),
            TagServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(err: CommentServiceError) -> Self {
        match err {
            CommentServiceError::NotFound(_) => ApiError::not_found(err.to_string()),
            CommentServiceError::ValidationError(_) => ApiError::validation_error(err.to_string()),
            CommentServiceError::Forbidden(_) => ApiError::forbidden(err.to_string()),
            CommentServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<ProfileServiceError> for ApiError {
    fn from(err: ProfileServiceError) -> Self {
        match err {
            ProfileServiceError::NotFound(_) => ApiError::not_found(err.to_string()),
            ProfileServiceError::ValidationError(_) => ApiError::validation_error(err.to_string()),
            ProfileServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::AuthenticationError(_) => ApiError::unauthorized(err.to_string()),
            UserServiceError::ValidationError(_) => ApiError::validation_error(err.to_string()),
            UserServiceError::UserExists(_) => ApiError::conflict(err.to_string()),
            UserServiceError::NotFound(_) => ApiError::not_found(err.to_string()),
            UserServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

/// Extract a bearer token from the Authorization header
fn extract_bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Resolve a bearer token to a user.
///
/// Session tokens are opaque hex strings; JWTs always contain '.', which is
/// never produced by the session generator.
async fn resolve_token(state: &AppState, token: &str) -> Result<Option<User>, ApiError> {
    if token.contains('.') {
        let email = match state.jwt_service.validate_access(token) {
            Ok(email) => email,
            Err(_) => return Ok(None),
        };
        let user = state
            .user_service
            .get_by_email(&email)
            .await
            .map_err(|e| ApiError::internal_error(e.to_string()))?;
        Ok(user)
    } else {
        state
            .user_service
            .validate_session(token)
            .await
            .map_err(|e| ApiError::internal_error(e.to_string()))
    }
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = resolve_token(&state, &token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Optional authentication middleware
///
/// A valid token identifies the viewer; a missing or bad token leaves the
/// request anonymous rather than failing it.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer_token(&request) {
        if let Ok(Some(user)) = resolve_token(&state, &token).await {
            request.extensions_mut().insert(AuthenticatedUser(user));
        }
    }
    next.run(request).await
}
