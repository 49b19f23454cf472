//! Tag model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity.
///
/// Tags are identified publicly by their `value` (unique string); posts
/// reference tags by value, never by internal id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    /// Unique identifier
    pub id: i64,
    /// Tag value (unique)
    pub value: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a new Tag with the given value.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(value: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            value,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_new() {
        let tag = Tag::new("rust".to_string());
        assert_eq!(tag.id, 0);
        assert_eq!(tag.value, "rust");
    }
}
