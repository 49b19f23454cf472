//! Auth API endpoints
//!
//! Two credential exchanges live side by side: `/auth/login` issues an
//! opaque session token, `/jwt` issues a signed access/refresh pair. Both
//! kinds are accepted as bearer tokens by the auth middleware.
//!
//! - POST /api/v1/auth/register - create an account
//! - POST /api/v1/auth/login - session token from credentials
//! - POST /api/v1/auth/logout - invalidate the session
//! - GET /api/v1/auth/me - the authenticated user
//! - GET/PUT /api/v1/auth/profile - the caller's author profile
//! - POST /api/v1/jwt - token pair from credentials
//! - POST /api/v1/jwt/refresh - new pair from a refresh token

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{ProfileResponse, UserResponse};
use crate::models::{CreateUserInput, UpdateProfileInput};
use crate::services::TokenPair;

/// Build the public auth router (no authentication required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Build the protected auth router (authentication required)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/profile", get(get_profile))
        .route("/profile", put(update_profile))
}

/// Build the JWT router
pub fn jwt_router() -> Router<AppState> {
    Router::new()
        .route("/", post(issue_tokens))
        .route("/refresh", post(refresh_tokens))
}

/// Credentials for login and JWT issuance
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Session token response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: String,
}

/// Request body for refreshing a token pair
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// POST /api/v1/auth/register - Create an account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.user_service.register(input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/v1/auth/login - Exchange credentials for a session token
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .user_service
        .login(&body.email, &body.password)
        .await?;

    Ok(Json(SessionResponse {
        token: session.id,
        expires_at: session.expires_at.to_rfc3339(),
    }))
}

/// POST /api/v1/auth/logout - Invalidate the presented session token
pub async fn logout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    request: Request,
) -> Result<StatusCode, ApiError> {
    // The middleware has already validated the header; extract the raw token
    // again so we know which session to drop.
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state.user_service.logout(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me - The authenticated user
pub async fn me(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(user.0.into())
}

/// GET /api/v1/auth/profile - The caller's author profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.profile_service.get_by_email(&user.0.email).await?;
    Ok(Json(profile.into()))
}

/// PUT /api/v1/auth/profile - Set the caller's bio
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<UpdateProfileInput>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.profile_service.update_own(&user.0, &input.bio).await?;
    Ok(Json(profile.into()))
}

/// POST /api/v1/jwt - Exchange credentials for an access/refresh pair
pub async fn issue_tokens(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let user = state
        .user_service
        .verify_credentials(&body.email, &body.password)
        .await?;

    let pair = state
        .jwt_service
        .issue_pair(&user.email)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(pair))
}

/// POST /api/v1/jwt/refresh - Exchange a refresh token for a new pair
pub async fn refresh_tokens(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let pair = state
        .jwt_service
        .refresh(&body.refresh)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    Ok(Json(pair))
}
