//! Tag service
//!
//! Tags are a flat vocabulary of unique string values. Posts reference them
//! by value; an unknown value is an error rather than an implicit create.

use crate::db::repositories::TagRepository;
use crate::models::Tag;
use anyhow::Context;
use std::sync::Arc;

/// Error types for tag service operations
#[derive(Debug, thiserror::Error)]
pub enum TagServiceError {
    /// Tag not found
    #[error("Tag not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A tag with this value already exists
    #[error("Tag already exists: {0}")]
    DuplicateValue(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Tag service for managing the tag vocabulary
pub struct TagService {
    repo: Arc<dyn TagRepository>,
}

impl TagService {
    /// Create a new tag service
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }

    /// Create a new tag.
    ///
    /// # Errors
    /// - `ValidationError` if the value is empty
    /// - `DuplicateValue` if the value is already taken
    pub async fn create(&self, value: &str) -> Result<Tag, TagServiceError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(TagServiceError::ValidationError(
                "Tag value cannot be empty".to_string(),
            ));
        }

        if self
            .repo
            .get_by_value(value)
            .await
            .context("Failed to check existing tag")?
            .is_some()
        {
            return Err(TagServiceError::DuplicateValue(value.to_string()));
        }

        let created = self
            .repo
            .create(&Tag::new(value.to_string()))
            .await
            .context("Failed to create tag")?;

        tracing::info!(tag_id = created.id, value = %created.value, "Tag created");
        Ok(created)
    }

    /// Get a tag by its exact value.
    pub async fn get_by_value(&self, value: &str) -> Result<Tag, TagServiceError> {
        self.repo
            .get_by_value(value)
            .await
            .context("Failed to get tag")?
            .ok_or_else(|| TagServiceError::NotFound(value.to_string()))
    }

    /// List all tags, ordered by value.
    pub async fn list(&self) -> Result<Vec<Tag>, TagServiceError> {
        Ok(self.repo.list().await.context("Failed to list tags")?)
    }

    /// Delete a tag by value. Post associations are removed with it.
    pub async fn delete(&self, value: &str) -> Result<(), TagServiceError> {
        let tag = self.get_by_value(value).await?;
        self.repo
            .delete(tag.id)
            .await
            .context("Failed to delete tag")?;
        tracing::info!(tag_id = tag.id, value = %tag.value, "Tag deleted");
        Ok(())
    }
}
