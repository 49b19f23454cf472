//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::models::Comment;

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a new comment and return it with its assigned id
    async fn create(&self, comment: &Comment) -> Result<Comment>;

    /// Get comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// List comments on a post, oldest first
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    /// Delete a comment
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: SqlitePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_comment(row: &SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        modified_at: row.get("modified_at"),
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, author_id, content, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(comment.modified_at)
        .execute(&self.pool)
        .await
        .context("Failed to create comment")?;

        let mut created = comment.clone();
        created.id = result.last_insert_rowid();
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(
            r#"
            SELECT id, post_id, author_id, content, created_at, modified_at
            FROM comments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get comment")?;

        Ok(row.map(|row| row_to_comment(&row)))
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, author_id, content, created_at, modified_at
            FROM comments
            WHERE post_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments")?;

        Ok(rows.iter().map(row_to_comment).collect())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete comment")?;
        Ok(())
    }
}
