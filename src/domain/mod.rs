// Domain layer - business logic with no HTTP concerns
// Every operation takes the store handle explicitly so handlers and tests can
// supply any BlogStore implementation

pub mod slug;
pub mod provisioning;
pub mod blogs;
pub mod comments;
pub mod users;

use crate::db::DatabaseError;

// Domain error type - no HTTP concerns
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

// Re-export commonly used types and functions
pub use slug::{allocate_slug, base_slug, normalize_title};
pub use provisioning::{provision_user, ProvisionOutcome};
pub use blogs::{create_blog, delete_blog, list_blogs, read_blog, toggle_featured, BlogDraft, BlogPage};
pub use comments::{create_comment, delete_comment, list_blog_comments, list_comments};
pub use users::{find_caller, save_blog, saved_blogs};
