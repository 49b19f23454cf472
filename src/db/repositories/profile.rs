//! Author profile repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;

use crate::models::AuthorProfile;

/// Author profile repository trait
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Get the profile for a user, if one exists
    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<AuthorProfile>>;

    /// Create or update the profile for a user
    async fn upsert(&self, user_id: i64, bio: &str) -> Result<AuthorProfile>;
}

/// SQLx-based author profile repository implementation
pub struct SqlxProfileRepository {
    pool: SqlitePool,
}

impl SqlxProfileRepository {
    /// Create a new SQLx profile repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ProfileRepository> {
        Arc::new(Self::new(pool))
    }
}

fn row_to_profile(row: &SqliteRow) -> AuthorProfile {
    AuthorProfile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        bio: row.get("bio"),
        created_at: row.get("created_at"),
        modified_at: row.get("modified_at"),
    }
}

#[async_trait]
impl ProfileRepository for SqlxProfileRepository {
    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<AuthorProfile>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, bio, created_at, modified_at
            FROM author_profiles
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get author profile")?;

        Ok(row.map(|row| row_to_profile(&row)))
    }

    async fn upsert(&self, user_id: i64, bio: &str) -> Result<AuthorProfile> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO author_profiles (user_id, bio, created_at, modified_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET bio = excluded.bio, modified_at = excluded.modified_at
            "#,
        )
        .bind(user_id)
        .bind(bio)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to upsert author profile")?;

        let profile = self
            .get_by_user_id(user_id)
            .await?
            .context("Profile missing after upsert")?;
        Ok(profile)
    }
}
