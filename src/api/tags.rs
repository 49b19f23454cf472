//! Tag API endpoints
//!
//! - GET /api/v1/tags - list the tag vocabulary
//! - POST /api/v1/tags - add a tag (auth required)
//! - DELETE /api/v1/tags/{value} - remove a tag (auth required)
//! - GET /api/v1/tags/{value}/posts - visible posts carrying a tag

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};
use crate::api::posts::ListPostsQuery;
use crate::api::responses::{PostListResponse, TagResponse};
use crate::models::ListParams;
use crate::services::PostFilter;

/// Build the public tags router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags))
        .route("/{value}/posts", get(list_posts_for_tag))
}

/// Request body for creating a tag
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub value: String,
}

/// GET /api/v1/tags - List all tags
pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = state.tag_service.list().await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// POST /api/v1/tags - Create a tag
pub async fn create_tag(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(body): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagResponse>), ApiError> {
    let tag = state.tag_service.create(&body.value).await?;
    Ok((StatusCode::CREATED, Json(tag.into())))
}

/// DELETE /api/v1/tags/{value} - Delete a tag
pub async fn delete_tag(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(value): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.tag_service.delete(&value).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/tags/{value}/posts - Visible posts carrying the tag
///
/// Unknown tag values are a 404 here, unlike the `?tag=` list filter which
/// just matches nothing.
pub async fn list_posts_for_tag(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(value): Path<String>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let tag = state.tag_service.get_by_value(&value).await?;

    let params = ListParams::new(query.page, query.per_page);
    let filter = PostFilter {
        period: None,
        tag: Some(tag.value),
        author: query.author,
    };

    let result = state
        .post_service
        .list(viewer.as_ref(), &filter, &params)
        .await?;

    Ok(Json(
        crate::api::posts::to_list_response(&state, result).await?,
    ))
}
