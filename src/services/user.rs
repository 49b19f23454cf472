//! User service
//!
//! Business logic for accounts and authentication:
//! - registration with argon2 password hashing
//! - login/logout with opaque session tokens
//! - session validation for the auth middleware
//! - public user lookup by email

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, Session, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Default session lifetime in days
const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A user with this email already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// User not found
    #[error("User not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// User service for managing accounts and sessions
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_ttl_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
        }
    }

    /// Create a new user service with a custom session lifetime
    pub fn with_session_ttl(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_ttl_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_ttl_days,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    /// - `ValidationError` if the email is empty or malformed, or the
    ///   password is too short
    /// - `UserExists` if the email is already taken
    pub async fn register(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        let email = input.email.trim().to_lowercase();

        if email.is_empty() || !email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }
        if input.password.len() < 8 {
            return Err(UserServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to check email uniqueness")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(email));
        }

        let password_hash = hash_password(&input.password)?;
        let user = User::new(email, input.first_name, input.last_name, password_hash);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!(user_id = created.id, "User registered");
        Ok(created)
    }

    /// Check a credential pair, returning the user on success.
    ///
    /// # Errors
    /// `AuthenticationError` for an unknown email or a wrong password; the
    /// two cases are indistinguishable to the caller.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        let user = self
            .user_repo
            .get_by_email(&email.trim().to_lowercase())
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError("Invalid email or password".to_string())
            })?;

        if !verify_password(password, &user.password_hash)? {
            return Err(UserServiceError::AuthenticationError(
                "Invalid email or password".to_string(),
            ));
        }

        Ok(user)
    }

    /// Log a user in, returning a fresh session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, UserServiceError> {
        let user = self.verify_credentials(email, password).await?;

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().simple().to_string(),
            user_id: user.id,
            expires_at: now + Duration::days(self.session_ttl_days),
            created_at: now,
        };

        self.session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(session)
    }

    /// Invalidate a session token.
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Returns `None` for an unknown or expired token; an expired session
    /// is removed as a side effect.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to look up session")?
        {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.session_repo
                .delete(&session.id)
                .await
                .context("Failed to delete expired session")?;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to load session user")?;
        Ok(user)
    }

    /// Public user lookup by email.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_email(email)
            .await
            .context("Failed to get user by email")?)
    }

    /// Remove expired sessions, returning the number deleted.
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, UserServiceError> {
        Ok(self
            .session_repo
            .delete_expired(Utc::now())
            .await
            .context("Failed to clean up sessions")?)
    }
}
