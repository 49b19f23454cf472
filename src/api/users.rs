//! User API endpoints
//!
//! - GET /api/v1/users/{email} - public user lookup

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::UserResponse;

/// Build the public users router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/{email}", get(get_user))
}

/// GET /api/v1/users/{email} - Look up a user by email
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .get_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User not found: {}", email)))?;

    Ok(Json(user.into()))
}
