//! Database connection pool
//!
//! SQLite-backed connection pool for single-binary deployment. The pool is
//! created from configuration; file-based databases get their parent
//! directory created on first use.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Create a database connection pool based on configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    // Ensure the database directory exists for file-based SQLite
    if !config.url.starts_with(":memory:") && !config.url.starts_with("sqlite::memory:") {
        let path = if config.url.starts_with("sqlite:") {
            config.url.trim_start_matches("sqlite:")
        } else {
            &config.url
        };

        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }
    }

    // Build the connection URL with create=true for file-based databases
    let connection_url = if config.url.starts_with("sqlite:") {
        // If it already has options, don't modify
        if config.url.contains('?') {
            config.url.clone()
        } else {
            format!("{}?mode=rwc", config.url)
        }
    } else if config.url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        // File path - add sqlite: prefix and create mode
        format!("sqlite:{}?mode=rwc", config.url)
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&connection_url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", config.url))?;

    // Enable foreign keys for SQLite
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("Failed to enable foreign keys")?;

    Ok(pool)
}

/// Create an in-memory database pool for testing.
pub async fn create_test_pool() -> Result<SqlitePool> {
    let config = DatabaseConfig {
        url: ":memory:".to_string(),
        max_connections: 1,
    };
    create_pool(&config).await
}
