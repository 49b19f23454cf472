//! Services layer - Business logic
//!
//! Services implement the business rules on top of the repositories:
//! validation, access control, and coordination between stores. Handlers
//! never touch a repository directly.

pub mod comment;
pub mod jwt;
pub mod password;
pub mod post;
pub mod profile;
pub mod tag;
pub mod user;

pub use comment::{CommentService, CommentServiceError};
pub use jwt::{Claims, JwtError, JwtService, TokenPair};
pub use password::{hash_password, verify_password};
pub use post::{generate_slug, PostFilter, PostService, PostServiceError};
pub use profile::{ProfileService, ProfileServiceError};
pub use tag::{TagService, TagServiceError};
pub use user::{UserService, UserServiceError};
