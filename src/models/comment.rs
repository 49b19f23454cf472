//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity, attached to a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Input for creating a new comment
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentInput {
    /// Slug of the post being commented on
    pub post: String,
    /// Comment body
    pub content: String,
}
