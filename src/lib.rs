pub mod models;
pub mod db;
pub mod auth;
pub mod domain;
pub mod config;
pub mod api;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use models::{
    AuthorSummary, Blog, BlogWithAuthor, Comment, CommentWithAuthor, NewBlog, NewComment,
    NewUser, User,
};

pub use db::{
    create_pool, with_retry, BlogStore, DatabaseError, MemoryStore, PgStore,
};

pub use domain::{
    allocate_slug, normalize_title, provision_user, DomainError, ProvisionOutcome,
};

pub use config::AppConfig;
