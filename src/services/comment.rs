//! Comment service
//!
//! Comments hang off posts and follow the post's visibility: nobody can
//! read or write comments on a post they cannot see. Deleting is reserved
//! for the comment's author.

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{Comment, Post, User};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Post or comment not found (or the post is not visible)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Caller may not perform this operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
    post_repo: Arc<dyn PostRepository>,
}

impl CommentService {
    /// Create a new comment service
    pub fn new(repo: Arc<dyn CommentRepository>, post_repo: Arc<dyn PostRepository>) -> Self {
        Self { repo, post_repo }
    }

    /// Load a post by slug, applying the post visibility rule.
    async fn visible_post(
        &self,
        viewer: Option<&User>,
        slug: &str,
    ) -> Result<Post, CommentServiceError> {
        let post = self
            .post_repo
            .get_by_slug(slug)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| CommentServiceError::NotFound(slug.to_string()))?;

        let owned = viewer.is_some_and(|u| u.id == post.author_id);
        if !post.is_public(Utc::now()) && !owned {
            return Err(CommentServiceError::NotFound(slug.to_string()));
        }
        Ok(post)
    }

    /// List comments on a post visible to the viewer, oldest first.
    pub async fn list(
        &self,
        viewer: Option<&User>,
        post_slug: &str,
    ) -> Result<Vec<Comment>, CommentServiceError> {
        let post = self.visible_post(viewer, post_slug).await?;
        Ok(self
            .repo
            .list_by_post(post.id)
            .await
            .context("Failed to list comments")?)
    }

    /// Add a comment to a post the caller can see.
    pub async fn create(
        &self,
        caller: &User,
        post_slug: &str,
        content: &str,
    ) -> Result<Comment, CommentServiceError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(CommentServiceError::ValidationError(
                "Comment content cannot be empty".to_string(),
            ));
        }

        let post = self.visible_post(Some(caller), post_slug).await?;

        let now = Utc::now();
        let comment = Comment {
            id: 0, // Will be set by the database
            post_id: post.id,
            author_id: caller.id,
            content: content.to_string(),
            created_at: now,
            modified_at: now,
        };

        let created = self
            .repo
            .create(&comment)
            .await
            .context("Failed to create comment")?;

        tracing::info!(comment_id = created.id, post_id = post.id, "Comment created");
        Ok(created)
    }

    /// Delete a comment. Only the comment's author may delete it.
    pub async fn delete(&self, caller: &User, comment_id: i64) -> Result<(), CommentServiceError> {
        let comment = self
            .repo
            .get_by_id(comment_id)
            .await
            .context("Failed to get comment")?
            .ok_or_else(|| CommentServiceError::NotFound(comment_id.to_string()))?;

        if comment.author_id != caller.id {
            return Err(CommentServiceError::Forbidden(
                "Only the comment author may delete it".to_string(),
            ));
        }

        self.repo
            .delete(comment.id)
            .await
            .context("Failed to delete comment")?;

        tracing::info!(comment_id = comment.id, "Comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxCommentRepository, SqlxPostRepository};
    use crate::db::{create_test_pool, migrations};
    use chrono::Duration;
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, CommentService) {
        let pool = create_test_pool().await.expect("test pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        let service = CommentService::new(
            SqlxCommentRepository::boxed(pool.clone()),
            SqlxPostRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    async fn create_user(pool: &SqlitePool, email: &str) -> User {
        let result = sqlx::query(
            "INSERT INTO users (email, first_name, last_name, password_hash) VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind("Test")
        .bind("User")
        .bind("hash123")
        .execute(pool)
        .await
        .expect("Failed to create test user");

        User {
            id: result.last_insert_rowid(),
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: "hash123".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn create_post(pool: &SqlitePool, slug: &str, author_id: i64, published: bool) {
        let published_at = published.then(|| Utc::now() - Duration::hours(1));
        sqlx::query(
            r#"
            INSERT INTO posts (slug, title, summary, content, author_id, published_at, created_at, modified_at)
            VALUES (?, ?, '', 'body', ?, ?, ?, ?)
            "#,
        )
        .bind(slug)
        .bind(slug)
        .bind(author_id)
        .bind(published_at)
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(pool)
        .await
        .expect("Failed to create test post");
    }

    #[tokio::test]
    async fn test_comment_on_published_post() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author@example.com").await;
        let reader = create_user(&pool, "reader@example.com").await;
        create_post(&pool, "hello", author.id, true).await;

        service
            .create(&reader, "hello", "First!")
            .await
            .expect("comment");
        service
            .create(&author, "hello", "Thanks")
            .await
            .expect("comment");

        let comments = service.list(None, "hello").await.expect("list");
        let bodies: Vec<_> = comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(bodies, vec!["First!", "Thanks"]);
    }

    #[tokio::test]
    async fn test_draft_post_hides_comments_from_others() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author@example.com").await;
        let reader = create_user(&pool, "reader@example.com").await;
        create_post(&pool, "draft", author.id, false).await;

        assert!(matches!(
            service.create(&reader, "draft", "sneaky").await,
            Err(CommentServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.list(Some(&reader), "draft").await,
            Err(CommentServiceError::NotFound(_))
        ));

        // The owner can still comment on their own draft
        service
            .create(&author, "draft", "note to self")
            .await
            .expect("comment");
    }

    #[tokio::test]
    async fn test_empty_comment_rejected() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author@example.com").await;
        create_post(&pool, "hello", author.id, true).await;

        assert!(matches!(
            service.create(&author, "hello", "   ").await,
            Err(CommentServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_only_author_deletes_comment() {
        let (pool, service) = setup().await;
        let author = create_user(&pool, "author@example.com").await;
        let reader = create_user(&pool, "reader@example.com").await;
        create_post(&pool, "hello", author.id, true).await;

        let comment = service
            .create(&reader, "hello", "mine")
            .await
            .expect("comment");

        assert!(matches!(
            service.delete(&author, comment.id).await,
            Err(CommentServiceError::Forbidden(_))
        ));
        service.delete(&reader, comment.id).await.expect("delete");
        assert!(service.list(None, "hello").await.expect("list").is_empty());
    }
}
