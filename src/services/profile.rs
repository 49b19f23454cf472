//! Author profile service
//!
//! Every user may carry at most one profile (a bio). Profiles are read
//! through the user's email and written only by the user themselves.

use crate::db::repositories::{ProfileRepository, UserRepository};
use crate::models::{AuthorProfile, User};
use anyhow::Context;
use std::sync::Arc;

/// Error types for profile service operations
#[derive(Debug, thiserror::Error)]
pub enum ProfileServiceError {
    /// User or profile not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Author profile service
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl ProfileService {
    /// Create a new profile service
    pub fn new(repo: Arc<dyn ProfileRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self { repo, user_repo }
    }

    /// Get the profile of the user with the given email.
    pub async fn get_by_email(&self, email: &str) -> Result<AuthorProfile, ProfileServiceError> {
        let user = self
            .user_repo
            .get_by_email(email)
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| ProfileServiceError::NotFound(email.to_string()))?;

        self.repo
            .get_by_user_id(user.id)
            .await
            .context("Failed to get profile")?
            .ok_or_else(|| ProfileServiceError::NotFound(email.to_string()))
    }

    /// Set or replace the caller's own bio.
    pub async fn update_own(
        &self,
        caller: &User,
        bio: &str,
    ) -> Result<AuthorProfile, ProfileServiceError> {
        let bio = bio.trim();
        if bio.is_empty() {
            return Err(ProfileServiceError::ValidationError(
                "Bio cannot be empty".to_string(),
            ));
        }

        let profile = self
            .repo
            .upsert(caller.id, bio)
            .await
            .context("Failed to save profile")?;

        tracing::info!(user_id = caller.id, "Profile updated");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxProfileRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};
    use chrono::Utc;
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, ProfileService) {
        let pool = create_test_pool().await.expect("test pool");
        migrations::run_migrations(&pool).await.expect("migrations");
        let service = ProfileService::new(
            SqlxProfileRepository::boxed(pool.clone()),
            SqlxUserRepository::boxed(pool.clone()),
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

    #[tokio::test]
    async fn test_update_and_read_profile() {
        let (pool, service) = setup().await;
        let user = create_user(&pool, "author@example.com").await;

        service.update_own(&user, "I write things").await.expect("set bio");
        let profile = service
            .get_by_email("author@example.com")
            .await
            .expect("profile");
        assert_eq!(profile.bio, "I write things");

        // A second write replaces the bio rather than creating another row
        service.update_own(&user, "New bio").await.expect("update bio");
        let profile = service
            .get_by_email("author@example.com")
            .await
            .expect("profile");
        assert_eq!(profile.bio, "New bio");
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_found() {
        let (pool, service) = setup().await;
        create_user(&pool, "noprofile@example.com").await;

        assert!(matches!(
            service.get_by_email("noprofile@example.com").await,
            Err(ProfileServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.get_by_email("ghost@example.com").await,
            Err(ProfileServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_bio_rejected() {
        let (pool, service) = setup().await;
        let user = create_user(&pool, "author@example.com").await;

        assert!(matches!(
            service.update_own(&user, "  ").await,
            Err(ProfileServiceError::ValidationError(_))
        ));
    }
}
