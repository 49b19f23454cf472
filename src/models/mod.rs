//! Data models
//!
//! This module contains all data structures used throughout Inkpress.
//! Models represent:
//! - Database entities (Post, Tag, Comment, AuthorProfile, User, Session)
//! - API request/response inputs
//! - Internal data transfer objects

mod comment;
mod post;
mod profile;
mod session;
mod tag;
mod user;

pub use comment::{Comment, CreateCommentInput};
pub use post::{CreatePostInput, ListParams, PagedResult, Period, Post, UpdatePostInput};
pub use profile::{AuthorProfile, UpdateProfileInput};
pub use session::Session;
pub use tag::Tag;
pub use user::{CreateUserInput, User};
