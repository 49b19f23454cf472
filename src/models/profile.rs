//! Author profile model
//!
//! Supplementary profile data keyed to a user. Managed alongside the user
//! account; no access-control logic of its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author profile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub id: i64,
    pub user_id: i64,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Input for updating the caller's profile
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileInput {
    pub bio: String,
}
