//! Inkpress - A blog content-management backend
//!
//! HTTP API over posts, tags, comments, and author profiles, with session-
//! and JWT-based authentication. Visibility and time-window filtering of
//! posts is handled by the post service.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
