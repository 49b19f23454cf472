//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod comment;
pub mod post;
pub mod profile;
pub mod session;
pub mod tag;
pub mod user;

pub use comment::{CommentRepository, SqlxCommentRepository};
pub use post::{PostQuery, PostRepository, SqlxPostRepository};
pub use profile::{ProfileRepository, SqlxProfileRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};
