//! User model
//!
//! Users are looked up publicly by email, never by internal id. The password
//! hash is stored but never serialized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (internal storage key)
    pub id: i64,
    /// Email address (unique, the public reference)
    pub email: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this
    /// function. Use `services::password::hash_password()` to hash it.
    pub fn new(
        email: String,
        first_name: String,
        last_name: String,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            email,
            first_name,
            last_name,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    /// Email address
    pub email: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Plaintext password (will be hashed)
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new(
            "test@example.com".to_string(),
            "Test".to_string(),
            "User".to_string(),
            "hashed_password".to_string(),
        );

        assert_eq!(user.id, 0);
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.first_name, "Test");
        assert_eq!(user.last_name, "User");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(
            "test@example.com".to_string(),
            "Test".to_string(),
            "User".to_string(),
            "secret-hash".to_string(),
        );

        let json = serde_json::to_string(&user).expect("serializable");
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
    }
}
