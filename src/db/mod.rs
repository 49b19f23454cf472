//! Database layer
//!
//! SQLite persistence for Inkpress:
//! - connection pool creation (`pool`)
//! - embedded, versioned migrations (`migrations`)
//! - repository traits and sqlx implementations (`repositories`)

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
