//! Post API endpoints
//!
//! - GET /api/v1/posts - list posts visible to the caller
//! - GET /api/v1/posts/by-time/{period} - list posts published in a window
//! - GET /api/v1/posts/{slug} - get a post by slug
//! - POST /api/v1/posts - create a post (auth required)
//! - PUT /api/v1/posts/{slug} - update a post (author only)
//! - DELETE /api/v1/posts/{slug} - delete a post (author only)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, MaybeUser};
use crate::api::responses::{PostListResponse, PostResponse};
use crate::models::{CreatePostInput, ListParams, PagedResult, Post, UpdatePostInput};
use crate::services::PostFilter;

/// Query parameters for listing posts
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    /// Filter by tag value
    pub tag: Option<String>,
    /// Filter by author email
    pub author: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    10
}

/// Build the public posts router (read-only)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/by-time/{period}", get(list_posts_by_period))
        .route("/{slug}", get(get_post))
        .route("/{slug}/comments", get(crate::api::comments::list_comments))
}

/// Resolve a post's author email and tags into the wire shape.
async fn to_response(state: &AppState, post: Post) -> Result<PostResponse, ApiError> {
    let author = state
        .user_repo
        .get_by_id(post.author_id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .ok_or_else(|| ApiError::internal_error("Post author missing"))?;
    let tags = state.post_service.tags_for(post.id).await?;
    Ok(PostResponse::new(post, author.email, tags))
}

pub(crate) async fn to_list_response(
    state: &AppState,
    result: PagedResult<Post>,
) -> Result<PostListResponse, ApiError> {
    let total = result.total;
    let page = result.page;
    let per_page = result.per_page;
    let total_pages = result.total_pages();

    let mut posts = Vec::with_capacity(result.items.len());
    for post in result.items {
        posts.push(to_response(state, post).await?);
    }

    Ok(PostListResponse {
        posts,
        total,
        page,
        per_page,
        total_pages,
    })
}

/// GET /api/v1/posts - List posts visible to the caller
pub async fn list_posts(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.per_page);
    let filter = PostFilter {
        period: None,
        tag: query.tag,
        author: query.author,
    };

    let result = state
        .post_service
        .list(viewer.as_ref(), &filter, &params)
        .await?;

    Ok(Json(to_list_response(&state, result).await?))
}

/// GET /api/v1/posts/by-time/{period} - List posts published within a window
///
/// `period` is one of `day`, `week`, `month`, `year`; anything else is a
/// validation error.
pub async fn list_posts_by_period(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(period): Path<String>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let period = period
        .parse()
        .map_err(|_| ApiError::validation_error(format!("Unknown period: {}", period)))?;

    let params = ListParams::new(query.page, query.per_page);
    let filter = PostFilter {
        period: Some(period),
        tag: query.tag,
        author: query.author,
    };

    let result = state
        .post_service
        .list(viewer.as_ref(), &filter, &params)
        .await?;

    Ok(Json(to_list_response(&state, result).await?))
}

/// GET /api/v1/posts/{slug} - Get a post by slug
pub async fn get_post(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.post_service.get_visible(viewer.as_ref(), &slug).await?;
    Ok(Json(to_response(&state, post).await?))
}

/// POST /api/v1/posts - Create a post
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreatePostInput>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let (post, tags) = state.post_service.create(&user.0, input).await?;
    let response = PostResponse::new(post, user.0.email, tags);
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/v1/posts/{slug} - Update a post
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Json<PostResponse>, ApiError> {
    let (post, tags) = state.post_service.update(&user.0, &slug, input).await?;
    let response = PostResponse::new(post, user.0.email, tags);
    Ok(Json(response))
}

/// DELETE /api/v1/posts/{slug} - Delete a post
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.post_service.delete(&user.0, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
