//! Configuration management
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides (`INKPRESS_*`). Missing optional values are filled with
//! sensible defaults; a missing file means all-defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path or sqlite: URL
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum pool connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "data/inkpress.db".to_string()
}

fn default_max_connections() -> u32 {
    20
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign JWTs
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token lifetime in minutes
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    /// Refresh token lifetime in days
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
    /// Session token lifetime in days
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl_minutes: default_access_ttl_minutes(),
            refresh_ttl_days: default_refresh_ttl_days(),
            session_ttl_days: default_session_ttl_days(),
        }
    }
}

fn default_jwt_secret() -> String {
    // Development default; override in production via INKPRESS_AUTH_JWT_SECRET
    "insecure-dev-secret".to_string()
}

fn default_access_ttl_minutes() -> i64 {
    15
}

fn default_refresh_ttl_days() -> i64 {
    14
}

fn default_session_ttl_days() -> i64 {
    7
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    pub fn load_with_env(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("INKPRESS_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("INKPRESS_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(origin) = std::env::var("INKPRESS_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        if let Ok(url) = std::env::var("INKPRESS_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("INKPRESS_AUTH_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Path::new("/nonexistent/config.yml")).expect("defaults");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "data/inkpress.db");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "server:\n  port: 9000").expect("write");

        let config = Config::load(file.path()).expect("parse");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.session_ttl_days, 7);
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let config = Config::load(file.path()).expect("defaults");
        assert_eq!(config.server.port, 8080);
    }
}
