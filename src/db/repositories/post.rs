//! Post repository
//!
//! Database operations for posts, including the visibility-aware listing
//! query used by the post resolver. Filters are composed dynamically:
//! the public-visibility rule, the optional viewer exemption for their own
//! posts, the optional publish-time window, and pass-through tag/author
//! equality filters.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

use crate::models::{ListParams, Post};

/// Filter set for listing posts.
///
/// `viewer_id` widens visibility to the viewer's own posts; everything else
/// narrows the result.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    /// Authenticated viewer, if any
    pub viewer_id: Option<i64>,
    /// Inclusive publish-time window
    pub window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Only posts carrying this tag value
    pub tag: Option<String>,
    /// Only posts authored by the user with this email
    pub author_email: Option<String>,
}

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post together with its tag associations in one
    /// transaction, returning the post with its assigned id
    async fn create(&self, post: &Post, tag_ids: &[i64]) -> Result<Post>;

    /// Persist changed fields of an existing post
    async fn update(&self, post: &Post) -> Result<()>;

    /// Delete a post
    async fn delete(&self, id: i64) -> Result<()>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Check whether a slug is already taken
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// List posts matching the query, newest published first,
    /// together with the total match count
    async fn list(&self, query: &PostQuery, params: &ListParams) -> Result<(Vec<Post>, i64)>;

    /// Replace the post's tag associations, preserving the given order
    async fn set_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()>;

    /// Total number of posts in the store
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_post(row: &SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        summary: row.get("summary"),
        content: row.get("content"),
        author_id: row.get("author_id"),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        modified_at: row.get("modified_at"),
    }
}

/// Append the WHERE clause for a `PostQuery`.
///
/// Anonymous viewers see only posts published at or before `now`; an
/// authenticated viewer additionally sees their own posts regardless of
/// publish state.
fn push_filters<'a>(
    builder: &mut QueryBuilder<'a, Sqlite>,
    query: &'a PostQuery,
    now: DateTime<Utc>,
) {
    builder.push(" WHERE ");

    match query.viewer_id {
        Some(viewer_id) => {
            builder
                .push("((p.published_at IS NOT NULL AND p.published_at <= ")
                .push_bind(now)
                .push(") OR p.author_id = ")
                .push_bind(viewer_id)
                .push(")");
        }
        None => {
            builder
                .push("(p.published_at IS NOT NULL AND p.published_at <= ")
                .push_bind(now)
                .push(")");
        }
    }

    if let Some((start, end)) = query.window {
        builder
            .push(" AND p.published_at >= ")
            .push_bind(start)
            .push(" AND p.published_at <= ")
            .push_bind(end);
    }

    if let Some(ref tag) = query.tag {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM post_tags pt \
                 JOIN tags t ON t.id = pt.tag_id \
                 WHERE pt.post_id = p.id AND t.value = ",
            )
            .push_bind(tag.as_str())
            .push(")");
    }

    if let Some(ref email) = query.author_email {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM users u \
                 WHERE u.id = p.author_id AND u.email = ",
            )
            .push_bind(email.as_str())
            .push(")");
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post, tag_ids: &[i64]) -> Result<Post> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let result = sqlx::query(
            r#"
            INSERT INTO posts (slug, title, summary, content, author_id, published_at, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(post.published_at)
        .bind(post.created_at)
        .bind(post.modified_at)
        .execute(&mut *tx)
        .await
        .context("Failed to create post")?;

        let post_id = result.last_insert_rowid();
        for (position, tag_id) in tag_ids.iter().enumerate() {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id, position) VALUES (?, ?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .bind(position as i64)
                .execute(&mut *tx)
                .await
                .context("Failed to associate tag")?;
        }

        tx.commit().await.context("Failed to commit post")?;

        let mut created = post.clone();
        created.id = post_id;
        Ok(created)
    }

    async fn update(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE posts
            SET slug = ?, title = ?, summary = ?, content = ?,
                author_id = ?, published_at = ?, modified_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.summary)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(post.published_at)
        .bind(post.modified_at)
        .bind(post.id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, slug, title, summary, content, author_id, published_at, created_at, modified_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post by ID")?;

        Ok(row.map(|row| row_to_post(&row)))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, slug, title, summary, content, author_id, published_at, created_at, modified_at
            FROM posts
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post by slug")?;

        Ok(row.map(|row| row_to_post(&row)))
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM posts WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to check slug existence")?;
        Ok(row.is_some())
    }

    async fn list(&self, query: &PostQuery, params: &ListParams) -> Result<(Vec<Post>, i64)> {
        let now = Utc::now();

        let mut count_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) AS n FROM posts p");
        push_filters(&mut count_builder, query, now);
        let total: i64 = count_builder
            .build()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts")?
            .get("n");

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT p.id, p.slug, p.title, p.summary, p.content, p.author_id, \
             p.published_at, p.created_at, p.modified_at FROM posts p",
        );
        push_filters(&mut builder, query, now);
        // Deterministic order for pagination: newest published first, id as tie-break
        builder
            .push(" ORDER BY p.published_at DESC, p.id DESC LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list posts")?;

        Ok((rows.iter().map(row_to_post).collect(), total))
    }

    async fn set_tags(&self, post_id: i64, tag_ids: &[i64]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM post_tags WHERE post_id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear post tags")?;

        for (position, tag_id) in tag_ids.iter().enumerate() {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id, position) VALUES (?, ?, ?)")
                .bind(post_id)
                .bind(tag_id)
                .bind(position as i64)
                .execute(&mut *tx)
                .await
                .context("Failed to associate tag")?;
        }

        tx.commit().await.context("Failed to commit tag associations")?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM posts")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts")?;
        Ok(row.get("n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> (SqlitePool, SqlxPostRepository) {
        let pool = create_test_pool().await.expect("test pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        let repo = SqlxPostRepository::new(pool.clone());
        (pool, repo)
    }

    async fn create_author(pool: &SqlitePool) -> i64 {
        sqlx::query(
            "INSERT INTO users (email, first_name, last_name, password_hash) VALUES (?, ?, ?, ?)",
        )
        .bind("author@example.com")
        .bind("Test")
        .bind("User")
        .bind("hash123")
        .execute(pool)
        .await
        .expect("Failed to create test user")
        .last_insert_rowid()
    }

    fn post(slug: &str, author_id: i64) -> Post {
        let now = Utc::now();
        Post {
            id: 0,
            slug: slug.to_string(),
            title: slug.to_string(),
            summary: String::new(),
            content: "body".to_string(),
            author_id,
            published_at: Some(now),
            created_at: now,
            modified_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_associates_tags() {
        let (pool, repo) = setup().await;
        let author_id = create_author(&pool).await;

        let tag_id = sqlx::query("INSERT INTO tags (value) VALUES ('rust')")
            .execute(&pool)
            .await
            .expect("tag")
            .last_insert_rowid();

        let created = repo
            .create(&post("hello", author_id), &[tag_id])
            .await
            .expect("create");
        assert!(created.id > 0);

        let linked: i64 = sqlx::query("SELECT COUNT(*) AS n FROM post_tags WHERE post_id = ?")
            .bind(created.id)
            .fetch_one(&pool)
            .await
            .expect("count")
            .get("n");
        assert_eq!(linked, 1);
    }

    #[tokio::test]
    async fn test_create_rolls_back_on_failed_association() {
        let (pool, repo) = setup().await;
        let author_id = create_author(&pool).await;

        // Nonexistent tag id violates the foreign key, which must undo
        // the post insert as well
        let result = repo.create(&post("orphaned", author_id), &[9999]).await;
        assert!(result.is_err());

        assert!(!repo.exists_by_slug("orphaned").await.expect("check"));
        assert_eq!(repo.count().await.expect("count"), 0);
    }
}
