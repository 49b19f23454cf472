//! Shared API response types
//!
//! Wire shapes for the JSON API. Authors are always rendered as their email
//! address and tags as plain value strings, in association order. User
//! objects never expose internal ids or password material.

use serde::{Deserialize, Serialize};

use crate::models::{AuthorProfile, Comment, Post, Tag, User};

/// Full post response
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub content: String,
    /// Author's email address
    pub author: String,
    pub published_at: Option<String>,
    pub created_at: String,
    pub modified_at: String,
    /// Tag values in association order
    pub tags: Vec<String>,
}

impl PostResponse {
    /// Build the wire shape from a post plus its resolved author and tags.
    pub fn new(post: Post, author_email: String, tags: Vec<Tag>) -> Self {
        Self {
            slug: post.slug,
            title: post.title,
            summary: post.summary,
            content: post.content,
            author: author_email,
            published_at: post.published_at.map(|dt| dt.to_rfc3339()),
            created_at: post.created_at.to_rfc3339(),
            modified_at: post.modified_at.to_rfc3339(),
            tags: tags.into_iter().map(|t| t.value).collect(),
        }
    }
}

/// Paginated post list response
#[derive(Debug, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

/// Public user response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

/// Tag response
#[derive(Debug, Serialize, Deserialize)]
pub struct TagResponse {
    pub value: String,
    pub created_at: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            value: tag.value,
            created_at: tag.created_at.to_rfc3339(),
        }
    }
}

/// Comment response
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub content: String,
    /// Author's email address
    pub author: String,
    pub created_at: String,
    pub modified_at: String,
}

impl CommentResponse {
    pub fn new(comment: Comment, author_email: String) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            author: author_email,
            created_at: comment.created_at.to_rfc3339(),
            modified_at: comment.modified_at.to_rfc3339(),
        }
    }
}

/// Author profile response
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub bio: String,
    pub created_at: String,
    pub modified_at: String,
}

impl From<AuthorProfile> for ProfileResponse {
    fn from(profile: AuthorProfile) -> Self {
        Self {
            bio: profile.bio,
            created_at: profile.created_at.to_rfc3339(),
            modified_at: profile.modified_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_user_response_hides_internals() {
        let user = User::new(
            "test@example.com".to_string(),
            "Test".to_string(),
            "User".to_string(),
            "secret-hash".to_string(),
        );
        let response = UserResponse::from(user);
        let json = serde_json::to_value(&response).expect("serialize");

        assert_eq!(json["email"], "test@example.com");
        assert!(json.get("id").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_post_response_author_is_email() {
        let now = Utc::now();
        let post = Post {
            id: 7,
            slug: "hello".to_string(),
            title: "Hello".to_string(),
            summary: String::new(),
            content: "body".to_string(),
            author_id: 3,
            published_at: None,
            created_at: now,
            modified_at: now,
        };
        let tags = vec![Tag::new("rust".to_string()), Tag::new("web".to_string())];

        let response = PostResponse::new(post, "author@example.com".to_string(), tags);
        let json = serde_json::to_value(&response).expect("serialize");

        assert_eq!(json["author"], "author@example.com");
        assert_eq!(json["tags"][0], "rust");
        assert_eq!(json["tags"][1], "web");
        assert!(json["published_at"].is_null());
        assert!(json.get("author_id").is_none());
    }
}
