//! Tag repository
//!
//! Database operations for tags. Tags are resolved by exact value match;
//! the resolver never creates tags implicitly.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::models::Tag;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, tag: &Tag) -> Result<Tag>;

    /// Get tag by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get tag by value (exact match)
    async fn get_by_value(&self, value: &str) -> Result<Option<Tag>>;

    /// List all tags
    async fn list(&self) -> Result<Vec<Tag>>;

    /// Delete a tag
    async fn delete(&self, id: i64) -> Result<()>;

    /// Get tags for a post, in association order
    async fn get_by_post_id(&self, post_id: i64) -> Result<Vec<Tag>>;
}

/// SQLx-based tag repository implementation
pub struct SqlxTagRepository {
    pool: SqlitePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_tag(row: &SqliteRow) -> Tag {
    Tag {
        id: row.get("id"),
        value: row.get("value"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, tag: &Tag) -> Result<Tag> {
        let now = Utc::now();

        let result = sqlx::query("INSERT INTO tags (value, created_at) VALUES (?, ?)")
            .bind(&tag.value)
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to create tag")?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            value: tag.value.clone(),
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, value, created_at FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by ID")?;

        Ok(row.map(|row| row_to_tag(&row)))
    }

    async fn get_by_value(&self, value: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, value, created_at FROM tags WHERE value = ?")
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by value")?;

        Ok(row.map(|row| row_to_tag(&row)))
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, value, created_at FROM tags ORDER BY value")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tags")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete tag")?;
        Ok(())
    }

    async fn get_by_post_id(&self, post_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.value, t.created_at
            FROM tags t
            JOIN post_tags pt ON pt.tag_id = t.id
            WHERE pt.post_id = ?
            ORDER BY pt.position
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to get tags for post")?;

        Ok(rows.iter().map(row_to_tag).collect())
    }
}
