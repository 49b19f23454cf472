//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `Period` enum for named trailing time windows
//! - Input types for creating and updating posts
//! - Pagination types for list queries

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Post title
    pub title: String,
    /// Short summary
    pub summary: String,
    /// Post body
    pub content: String,
    /// Author user ID
    pub author_id: i64,
    /// Publication timestamp; the post is unpublished while absent or in the future
    pub published_at: Option<DateTime<Utc>>,
    /// Creation timestamp (server-assigned)
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp (server-assigned)
    pub modified_at: DateTime<Utc>,
}

impl Post {
    /// Whether the post is visible to the public at the given instant.
    ///
    /// A post is public iff `published_at` is set and not in the future.
    pub fn is_public(&self, now: DateTime<Utc>) -> bool {
        matches!(self.published_at, Some(at) if at <= now)
    }
}

/// Named trailing time window used to filter posts by publish time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    /// Length of the window.
    pub fn duration(&self) -> Duration {
        match self {
            Period::Day => Duration::days(1),
            Period::Week => Duration::days(7),
            Period::Month => Duration::days(30),
            Period::Year => Duration::days(365),
        }
    }

    /// Resolve the window `[now - period, now]`.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - self.duration(), now)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(format!("Unknown period name: {}", s)),
        }
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostInput {
    /// Post title
    pub title: String,
    /// URL-friendly slug; may be omitted when `autogenerate_slug` is set
    pub slug: Option<String>,
    /// Derive the slug from the title when no slug is given
    #[serde(default)]
    pub autogenerate_slug: bool,
    /// Short summary
    #[serde(default)]
    pub summary: String,
    /// Post body
    pub content: String,
    /// Author email; defaults to the caller and must match them
    pub author: Option<String>,
    /// Publication timestamp (optional; absent means draft)
    pub published_at: Option<DateTime<Utc>>,
    /// Tag values to associate (must already exist)
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Input for updating an existing post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New slug (optional)
    pub slug: Option<String>,
    /// New summary (optional)
    pub summary: Option<String>,
    /// New content (optional)
    pub content: Option<String>,
    /// New author email; must match the caller when supplied
    pub author: Option<String>,
    /// New publication timestamp (optional; `Some(None)` clears it)
    #[serde(default, with = "double_option")]
    pub published_at: Option<Option<DateTime<Utc>>>,
    /// Replacement tag values (optional)
    pub tags: Option<Vec<String>>,
}

/// Serde helper distinguishing "field absent" from "field set to null".
mod double_option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<DateTime<Utc>>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<DateTime<Utc>>>, D::Error> {
        Option::<DateTime<Utc>>::deserialize(deserializer).map(Some)
    }
}

impl UpdatePostInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.slug.is_some()
            || self.summary.is_some()
            || self.content.is_some()
            || self.author.is_some()
            || self.published_at.is_some()
            || self.tags.is_some()
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries.
    ///
    /// Computed in i64 so an arbitrary client-supplied page cannot overflow.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let per_page = i64::from(self.per_page);
        ((self.total + per_page - 1) / per_page) as u32
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_period_from_str() {
        assert_eq!(Period::from_str("day").unwrap(), Period::Day);
        assert_eq!(Period::from_str("WEEK").unwrap(), Period::Week);
        assert_eq!(Period::from_str("Month").unwrap(), Period::Month);
        assert_eq!(Period::from_str("year").unwrap(), Period::Year);
        assert!(Period::from_str("fortnight").is_err());
    }

    #[test]
    fn test_period_window() {
        let now = Utc::now();
        let (start, end) = Period::Week.window(now);
        assert_eq!(end, now);
        assert_eq!(end - start, Duration::days(7));
    }

    #[test]
    fn test_post_is_public() {
        let now = Utc::now();
        let mut post = Post {
            id: 1,
            slug: "hello".to_string(),
            title: "Hello".to_string(),
            summary: String::new(),
            content: String::new(),
            author_id: 1,
            published_at: None,
            created_at: now,
            modified_at: now,
        };

        assert!(!post.is_public(now));

        post.published_at = Some(now - Duration::hours(1));
        assert!(post.is_public(now));

        post.published_at = Some(now + Duration::hours(1));
        assert!(!post.is_public(now));
    }

    #[test]
    fn test_list_params_clamping() {
        let params = ListParams::new(0, 1000);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_paged_result_total_pages() {
        let params = ListParams::new(1, 10);
        let result: PagedResult<i32> = PagedResult::new(vec![], 25, &params);
        assert_eq!(result.total_pages(), 3);
    }

    #[test]
    fn test_offset_huge_page_does_not_overflow() {
        let params = ListParams::new(u32::MAX, 100);
        assert_eq!(params.offset(), (i64::from(u32::MAX) - 1) * 100);
    }

    #[test]
    fn test_total_pages_huge_total() {
        let params = ListParams::new(1, 10);
        let result: PagedResult<i32> = PagedResult::new(vec![], 10_000_000_000, &params);
        assert_eq!(result.total_pages(), 1_000_000_000);
    }

    #[test]
    fn test_update_published_at_null_clears() {
        let input: UpdatePostInput =
            serde_json::from_str(r#"{"published_at": null}"#).expect("valid json");
        assert_eq!(input.published_at, Some(None));

        let input: UpdatePostInput = serde_json::from_str(r#"{}"#).expect("valid json");
        assert_eq!(input.published_at, None);
    }
}
