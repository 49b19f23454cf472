//! Comment API endpoints
//!
//! - GET /api/v1/posts/{slug}/comments - comments on a visible post
//! - POST /api/v1/comments - add a comment (auth required)
//! - DELETE /api/v1/comments/{id} - delete own comment (auth required)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};
use crate::api::responses::CommentResponse;
use crate::models::{Comment, CreateCommentInput};

/// Resolve a comment's author email into the wire shape.
async fn to_response(state: &AppState, comment: Comment) -> Result<CommentResponse, ApiError> {
    let author = state
        .user_repo
        .get_by_id(comment.author_id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .ok_or_else(|| ApiError::internal_error("Comment author missing"))?;
    Ok(CommentResponse::new(comment, author.email))
}

/// GET /api/v1/posts/{slug}/comments - List comments on a post, oldest first
pub async fn list_comments(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(post_slug): Path<String>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let comments = state
        .comment_service
        .list(viewer.as_ref(), &post_slug)
        .await?;

    let mut responses = Vec::with_capacity(comments.len());
    for comment in comments {
        responses.push(to_response(&state, comment).await?);
    }
    Ok(Json(responses))
}

/// POST /api/v1/comments - Add a comment to a visible post
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreateCommentInput>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let comment = state
        .comment_service
        .create(&user.0, &input.post, &input.content)
        .await?;
    let response = CommentResponse::new(comment, user.0.email);
    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/v1/comments/{id} - Delete one's own comment
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.comment_service.delete(&user.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
