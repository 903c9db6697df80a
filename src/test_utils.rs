//! Test doubles shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::db::{BlogStore, DatabaseError, MemoryStore, Page, Result};
use crate::models::{
    Blog, BlogWithAuthor, Comment, CommentWithAuthor, NewBlog, NewComment, NewUser, User,
};

/// Wraps a [`MemoryStore`] and can make existence probes miss, reproducing the
/// window in which a concurrent writer inserts between our check and our insert.
#[derive(Debug, Default)]
pub struct BlindProbeStore {
    inner: MemoryStore,
    blind_slug_probes: AtomicUsize,
    blind_user_lookups: AtomicUsize,
    failing_slug_probes: AtomicUsize,
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

impl BlindProbeStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// The next `n` calls to `slug_exists` report the slug as free
    pub fn blind_slug_probes(&self, n: usize) {
        self.blind_slug_probes.store(n, Ordering::SeqCst);
    }

    /// The next `n` calls to `slug_exists` fail as if the pool timed out
    pub fn fail_slug_probes(&self, n: usize) {
        self.failing_slug_probes.store(n, Ordering::SeqCst);
    }

    /// The next `n` calls to `find_user_by_clerk_id` return nothing
    pub fn blind_user_lookups(&self, n: usize) {
        self.blind_user_lookups.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlogStore for BlindProbeStore {
    async fn find_user_by_clerk_id(&self, clerk_user_id: &str) -> Result<Option<User>> {
        if take_one(&self.blind_user_lookups) {
            return Ok(None);
        }
        self.inner.find_user_by_clerk_id(clerk_user_id).await
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        self.inner.insert_user(user).await
    }

    async fn append_saved_blog(&self, user_id: i64, blog_id: i64) -> Result<bool> {
        self.inner.append_saved_blog(user_id, blog_id).await
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        if take_one(&self.failing_slug_probes) {
            return Err(DatabaseError::ConnectionError("pool timed out".to_string()));
        }
        if take_one(&self.blind_slug_probes) {
            return Ok(false);
        }
        self.inner.slug_exists(slug).await
    }

    async fn insert_blog(&self, blog: &NewBlog) -> Result<Blog> {
        self.inner.insert_blog(blog).await
    }

    async fn find_blog_by_id(&self, blog_id: i64) -> Result<Option<Blog>> {
        self.inner.find_blog_by_id(blog_id).await
    }

    async fn find_blog_by_slug(&self, slug: &str) -> Result<Option<BlogWithAuthor>> {
        self.inner.find_blog_by_slug(slug).await
    }

    async fn list_blogs(&self, page: Page) -> Result<Vec<BlogWithAuthor>> {
        self.inner.list_blogs(page).await
    }

    async fn count_blogs(&self) -> Result<i64> {
        self.inner.count_blogs().await
    }

    async fn increment_visit_count(&self, slug: &str) -> Result<bool> {
        self.inner.increment_visit_count(slug).await
    }

    async fn toggle_featured(&self, blog_id: i64) -> Result<Option<Blog>> {
        self.inner.toggle_featured(blog_id).await
    }

    async fn delete_blog(&self, blog_id: i64, user_id: i64) -> Result<bool> {
        self.inner.delete_blog(blog_id, user_id).await
    }

    async fn list_comments(&self) -> Result<Vec<Comment>> {
        self.inner.list_comments().await
    }

    async fn list_blog_comments(&self, blog_id: i64) -> Result<Vec<CommentWithAuthor>> {
        self.inner.list_blog_comments(blog_id).await
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        self.inner.insert_comment(comment).await
    }

    async fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<bool> {
        self.inner.delete_comment(comment_id, user_id).await
    }

    async fn health_check(&self) -> Result<()> {
        self.inner.health_check().await
    }
}
