//! Post service
//!
//! The access-control and query-filtering contract for posts:
//! - visibility: the public sees only posts published at or before now;
//!   an authenticated viewer additionally sees their own posts
//! - period filtering over named trailing windows
//! - slug handling (explicit or autogenerated from the title, unique)
//! - tags resolved by value against existing tags, never created implicitly
//! - the author reference is an email and must be the caller

use crate::db::repositories::{PostQuery, PostRepository, TagRepository, UserRepository};
use crate::models::{
    CreatePostInput, ListParams, PagedResult, Period, Post, Tag, UpdatePostInput, User,
};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found (or not visible to the caller)
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Validation error (missing slug, unknown tag value, unknown period, ...)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Caller is authenticated but not permitted (author mismatch)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Duplicate slug (uniqueness conflict)
    #[error("Post slug already exists: {0}")]
    DuplicateSlug(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Filters accepted by the listing operation
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Named trailing publish-time window
    pub period: Option<Period>,
    /// Only posts carrying this tag value
    pub tag: Option<String>,
    /// Only posts authored by the user with this email
    pub author: Option<String>,
}

/// Post service implementing the access and query resolver
pub struct PostService {
    repo: Arc<dyn PostRepository>,
    tag_repo: Arc<dyn TagRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(
        repo: Arc<dyn PostRepository>,
        tag_repo: Arc<dyn TagRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            repo,
            tag_repo,
            user_repo,
        }
    }

    /// List posts visible to the viewer, most recently published first.
    ///
    /// Anonymous viewers see only published posts; an authenticated viewer
    /// additionally sees their own drafts and future-dated posts. The period
    /// filter restricts `published_at` to `[now - period, now]`.
    pub async fn list(
        &self,
        viewer: Option<&User>,
        filter: &PostFilter,
        params: &ListParams,
    ) -> Result<PagedResult<Post>, PostServiceError> {
        let query = PostQuery {
            viewer_id: viewer.map(|u| u.id),
            window: filter.period.map(|p| p.window(Utc::now())),
            tag: filter.tag.clone(),
            author_email: filter.author.clone(),
        };

        let (items, total) = self
            .repo
            .list(&query, params)
            .await
            .context("Failed to list posts")?;

        Ok(PagedResult::new(items, total, params))
    }

    /// Get a single post by slug, subject to the visibility rule.
    ///
    /// An unpublished post that the viewer does not own reads as NotFound,
    /// so existence is not leaked.
    pub async fn get_visible(
        &self,
        viewer: Option<&User>,
        slug: &str,
    ) -> Result<Post, PostServiceError> {
        let post = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(slug.to_string()))?;

        let owned = viewer.is_some_and(|u| u.id == post.author_id);
        if !post.is_public(Utc::now()) && !owned {
            return Err(PostServiceError::NotFound(slug.to_string()));
        }

        Ok(post)
    }

    /// Create a new post authored by the caller.
    ///
    /// # Errors
    /// - `ValidationError` for an empty title/content, a missing slug without
    ///   autogeneration, a malformed slug, or an unknown tag value
    /// - `Forbidden` when `author` names anyone but the caller
    /// - `DuplicateSlug` when the slug is already taken
    pub async fn create(
        &self,
        caller: &User,
        input: CreatePostInput,
    ) -> Result<(Post, Vec<Tag>), PostServiceError> {
        if input.title.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Title must not be empty".to_string(),
            ));
        }
        if input.content.trim().is_empty() {
            return Err(PostServiceError::ValidationError(
                "Content must not be empty".to_string(),
            ));
        }

        let slug = match input.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => {
                validate_slug(slug)?;
                slug.to_string()
            }
            _ if input.autogenerate_slug => {
                let slug = generate_slug(&input.title);
                if slug.is_empty() {
                    return Err(PostServiceError::ValidationError(
                        "Could not derive a slug from the title".to_string(),
                    ));
                }
                slug
            }
            _ => {
                return Err(PostServiceError::ValidationError(
                    "slug is required if autogenerate_slug is not set".to_string(),
                ));
            }
        };

        let author = self.resolve_author(caller, input.author.as_deref()).await?;
        let tags = self.resolve_tags(&input.tags).await?;

        if self
            .repo
            .exists_by_slug(&slug)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(PostServiceError::DuplicateSlug(slug));
        }

        let now = Utc::now();
        let post = Post {
            id: 0, // Will be set by the database
            slug,
            title: input.title,
            summary: input.summary,
            content: input.content,
            author_id: author.id,
            published_at: input.published_at,
            created_at: now,
            modified_at: now,
        };

        // Concurrent writers may race past the existence check; the store's
        // uniqueness constraint is the serialization point. The insert and
        // its tag associations commit together.
        let tag_ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
        let created = match self.repo.create(&post, &tag_ids).await {
            Ok(created) => created,
            Err(e) if is_unique_violation(&e) => {
                return Err(PostServiceError::DuplicateSlug(post.slug));
            }
            Err(e) => return Err(PostServiceError::InternalError(e)),
        };

        tracing::info!(post_id = created.id, slug = %created.slug, "Post created");
        Ok((created, tags))
    }

    /// Update an existing post. Only the post's author may update it.
    pub async fn update(
        &self,
        caller: &User,
        slug: &str,
        input: UpdatePostInput,
    ) -> Result<(Post, Vec<Tag>), PostServiceError> {
        let mut post = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(slug.to_string()))?;

        if post.author_id != caller.id {
            return Err(PostServiceError::Forbidden(
                "Only the author may modify this post".to_string(),
            ));
        }

        if !input.has_changes() {
            return Err(PostServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }

        // A supplied author reference still must be the caller
        self.resolve_author(caller, input.author.as_deref()).await?;

        if let Some(new_slug) = input.slug.as_deref().map(str::trim) {
            validate_slug(new_slug)?;
            if new_slug != post.slug {
                if self
                    .repo
                    .exists_by_slug(new_slug)
                    .await
                    .context("Failed to check slug uniqueness")?
                {
                    return Err(PostServiceError::DuplicateSlug(new_slug.to_string()));
                }
                post.slug = new_slug.to_string();
            }
        }

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Title must not be empty".to_string(),
                ));
            }
            post.title = title;
        }
        if let Some(summary) = input.summary {
            post.summary = summary;
        }
        if let Some(content) = input.content {
            if content.trim().is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Content must not be empty".to_string(),
                ));
            }
            post.content = content;
        }
        if let Some(published_at) = input.published_at {
            post.published_at = published_at;
        }

        let tags = match input.tags {
            Some(ref values) => {
                let tags = self.resolve_tags(values).await?;
                self.repo
                    .set_tags(post.id, &tags.iter().map(|t| t.id).collect::<Vec<_>>())
                    .await
                    .context("Failed to update tags")?;
                tags
            }
            None => self
                .tag_repo
                .get_by_post_id(post.id)
                .await
                .context("Failed to load tags")?,
        };

        post.modified_at = Utc::now();

        match self.repo.update(&post).await {
            Ok(()) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(PostServiceError::DuplicateSlug(post.slug));
            }
            Err(e) => return Err(PostServiceError::InternalError(e)),
        }

        tracing::info!(post_id = post.id, slug = %post.slug, "Post updated");
        Ok((post, tags))
    }

    /// Delete a post. Only the post's author may delete it.
    pub async fn delete(&self, caller: &User, slug: &str) -> Result<(), PostServiceError> {
        let post = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(slug.to_string()))?;

        if post.author_id != caller.id {
            return Err(PostServiceError::Forbidden(
                "Only the author may delete this post".to_string(),
            ));
        }

        self.repo
            .delete(post.id)
            .await
            .context("Failed to delete post")?;

        tracing::info!(post_id = post.id, slug = %post.slug, "Post deleted");
        Ok(())
    }

    /// Tags associated with a post, in association order.
    pub async fn tags_for(&self, post_id: i64) -> Result<Vec<Tag>, PostServiceError> {
        Ok(self
            .tag_repo
            .get_by_post_id(post_id)
            .await
            .context("Failed to load tags")?)
    }

    /// Total number of posts in the store.
    pub async fn count(&self) -> Result<i64, PostServiceError> {
        Ok(self.repo.count().await.context("Failed to count posts")?)
    }

    /// Enforce the author reference rule: a supplied author email must name
    /// the caller, and the referenced user must exist. Absent means the
    /// caller.
    async fn resolve_author(
        &self,
        caller: &User,
        author: Option<&str>,
    ) -> Result<User, PostServiceError> {
        let email = match author {
            Some(email) => email.trim().to_lowercase(),
            None => return Ok(caller.clone()),
        };

        if email != caller.email {
            return Err(PostServiceError::Forbidden(format!(
                "Cannot author a post as {}",
                email
            )));
        }

        let user = self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to resolve author")?
            .ok_or_else(|| {
                PostServiceError::ValidationError(format!("Unknown author: {}", email))
            })?;

        Ok(user)
    }

    /// Resolve tag values against existing tags. Duplicates are collapsed
    /// preserving first-occurrence order; an unknown value is an error.
    async fn resolve_tags(&self, values: &[String]) -> Result<Vec<Tag>, PostServiceError> {
        let mut seen = Vec::new();
        let mut tags = Vec::new();

        for value in values {
            let value = value.trim();
            if value.is_empty() || seen.contains(&value) {
                continue;
            }
            seen.push(value);

            let tag = self
                .tag_repo
                .get_by_value(value)
                .await
                .context("Failed to resolve tag")?
                .ok_or_else(|| {
                    PostServiceError::ValidationError(format!("Unknown tag: {}", value))
                })?;
            tags.push(tag);
        }

        Ok(tags)
    }
}

/// Generate a URL-safe slug from a title.
///
/// Lowercases and collapses whitespace/punctuation runs into single hyphens,
/// trimming hyphens from both ends. ASCII-only by construction: accented and
/// other non-ASCII letters are treated as separators rather than
/// transliterated, keeping generated slugs inside the character set
/// `validate_slug` accepts for client-supplied ones.
pub fn generate_slug(title: &str) -> String {
    let mapped: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    // Remove consecutive hyphens and trim hyphens from ends
    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in mapped.chars() {
        if c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push(c);
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}

/// A client-supplied slug must already be URL-safe.
fn validate_slug(slug: &str) -> Result<(), PostServiceError> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PostServiceError::ValidationError(format!(
            "Invalid slug: {}",
            slug
        )))
    }
}

/// Whether the error chain bottoms out in a database uniqueness violation.
fn is_unique_violation(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.is_unique_violation())
}
