//! JWT issuance and validation
//!
//! Mints access/refresh token pairs and validates them. Tokens carry the
//! user's email as subject; the `token_type` claim keeps refresh tokens out
//! of request authentication.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Error types for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Token is expired, malformed, or has a bad signature
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token is valid but of the wrong type for this operation
    #[error("Wrong token type: expected {expected}")]
    WrongTokenType { expected: &'static str },

    /// Signing failed
    #[error("Failed to sign token: {0}")]
    SigningError(String),
}

/// Claims carried by both access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email (public reference)
    pub sub: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
    /// "access" or "refresh"
    pub token_type: String,
}

/// An access/refresh token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// JWT service holding the signing key and lifetimes
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(secret: &str, access_ttl_minutes: i64, refresh_ttl_days: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::minutes(access_ttl_minutes),
            refresh_ttl: Duration::days(refresh_ttl_days),
        }
    }

    fn sign(&self, email: &str, token_type: &str, ttl: Duration) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::SigningError(e.to_string()))
    }

    /// Issue an access/refresh pair for the given user email
    pub fn issue_pair(&self, email: &str) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access: self.sign(email, "access", self.access_ttl)?,
            refresh: self.sign(email, "refresh", self.refresh_ttl)?,
        })
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }

    /// Validate an access token, returning the subject email
    pub fn validate_access(&self, token: &str) -> Result<String, JwtError> {
        let claims = self.decode_claims(token)?;
        if claims.token_type != "access" {
            return Err(JwtError::WrongTokenType { expected: "access" });
        }
        Ok(claims.sub)
    }

    /// Exchange a refresh token for a new pair
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, JwtError> {
        let claims = self.decode_claims(refresh_token)?;
        if claims.token_type != "refresh" {
            return Err(JwtError::WrongTokenType { expected: "refresh" });
        }
        self.issue_pair(&claims.sub)
    }
}
