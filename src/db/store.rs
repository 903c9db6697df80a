use async_trait::async_trait;

use crate::db::errors::Result;
use crate::models::{
    Blog, BlogWithAuthor, Comment, CommentWithAuthor, NewBlog, NewComment, NewUser, User,
};

/// Skip/limit window for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    /// Window for a 1-based page number
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            skip: (page.max(1) - 1).saturating_mul(limit),
            limit,
        }
    }
}

/// Persistent record store shared by every handler.
///
/// Implementations must enforce the unique constraints named in
/// [`crate::db::errors`] and report violations as
/// [`crate::db::DatabaseError::UniqueViolation`]; callers rely on that signal
/// to resolve check-then-insert races.
#[async_trait]
pub trait BlogStore: Send + Sync {
    async fn find_user_by_clerk_id(&self, clerk_user_id: &str) -> Result<Option<User>>;

    async fn insert_user(&self, user: &NewUser) -> Result<User>;

    /// Append `blog_id` to the user's saved list unless already present.
    /// Returns `false` when the id was already saved.
    async fn append_saved_blog(&self, user_id: i64, blog_id: i64) -> Result<bool>;

    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    async fn insert_blog(&self, blog: &NewBlog) -> Result<Blog>;

    async fn find_blog_by_id(&self, blog_id: i64) -> Result<Option<Blog>>;

    async fn find_blog_by_slug(&self, slug: &str) -> Result<Option<BlogWithAuthor>>;

    /// Blogs in insertion order
    async fn list_blogs(&self, page: Page) -> Result<Vec<BlogWithAuthor>>;

    async fn count_blogs(&self) -> Result<i64>;

    /// Returns `false` when no blog has this slug
    async fn increment_visit_count(&self, slug: &str) -> Result<bool>;

    /// Flip `is_featured`, returning the updated blog
    async fn toggle_featured(&self, blog_id: i64) -> Result<Option<Blog>>;

    /// Delete a blog owned by `user_id`. Returns `false` when no such blog exists
    /// or it belongs to someone else.
    async fn delete_blog(&self, blog_id: i64, user_id: i64) -> Result<bool>;

    async fn list_comments(&self) -> Result<Vec<Comment>>;

    /// Comments of a blog, newest first
    async fn list_blog_comments(&self, blog_id: i64) -> Result<Vec<CommentWithAuthor>>;

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment>;

    /// Delete a comment owned by `user_id`
    async fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<bool>;

    async fn health_check(&self) -> Result<()>;
}
