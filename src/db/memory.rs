// In-process store with the same constraint behaviour as the Postgres schema.
// Backs the test suite and local runs without a database.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::db::errors::{
    DatabaseError, Result, BLOG_SLUG_CONSTRAINT, USER_CLERK_ID_CONSTRAINT, USER_EMAIL_CONSTRAINT,
};
use crate::db::store::{BlogStore, Page};
use crate::models::{
    AuthorSummary, Blog, BlogWithAuthor, Comment, CommentWithAuthor, NewBlog, NewComment, NewUser,
    User,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    blogs: Vec<Blog>,
    comments: Vec<Comment>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, user_id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    fn author_of(&self, user_id: i64) -> Result<AuthorSummary> {
        self.user(user_id)
            .map(AuthorSummary::from)
            .ok_or_else(|| DatabaseError::IntegrityError(format!("user {} does not exist", user_id)))
    }

    fn with_author(&self, blog: &Blog) -> Result<BlogWithAuthor> {
        Ok(BlogWithAuthor {
            blog: blog.clone(),
            author: self.author_of(blog.user_id)?,
        })
    }
}

fn unique_violation(constraint: &str) -> DatabaseError {
    DatabaseError::UniqueViolation {
        constraint: constraint.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn blog_count(&self) -> usize {
        self.tables.read().await.blogs.len()
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn find_user_by_clerk_id(&self, clerk_user_id: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.clerk_user_id == clerk_user_id)
            .cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.clerk_user_id == user.clerk_user_id) {
            return Err(unique_violation(USER_CLERK_ID_CONSTRAINT));
        }
        if let Some(email) = &user.email {
            if tables.users.iter().any(|u| u.email.as_ref() == Some(email)) {
                return Err(unique_violation(USER_EMAIL_CONSTRAINT));
            }
        }

        let now = Utc::now();
        let created = User {
            id: tables.next_id(),
            clerk_user_id: user.clerk_user_id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            img: user.img.clone(),
            saved_blogs: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn append_saved_blog(&self, user_id: i64, blog_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(false);
        };
        if user.saved_blogs.contains(&blog_id) {
            return Ok(false);
        }
        user.saved_blogs.push(blog_id);
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.blogs.iter().any(|b| b.slug == slug))
    }

    async fn insert_blog(&self, blog: &NewBlog) -> Result<Blog> {
        let mut tables = self.tables.write().await;

        if tables.user(blog.user_id).is_none() {
            return Err(DatabaseError::IntegrityError(format!(
                "user {} does not exist",
                blog.user_id
            )));
        }
        if tables.blogs.iter().any(|b| b.slug == blog.slug) {
            return Err(unique_violation(BLOG_SLUG_CONSTRAINT));
        }

        let now = Utc::now();
        let created = Blog {
            id: tables.next_id(),
            user_id: blog.user_id,
            title: blog.title.clone(),
            slug: blog.slug.clone(),
            category: blog.category.clone(),
            description: blog.description.clone(),
            content: blog.content.clone(),
            cover_img: blog.cover_img.clone(),
            is_featured: false,
            visit_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.blogs.push(created.clone());
        Ok(created)
    }

    async fn find_blog_by_id(&self, blog_id: i64) -> Result<Option<Blog>> {
        let tables = self.tables.read().await;
        Ok(tables.blogs.iter().find(|b| b.id == blog_id).cloned())
    }

    async fn find_blog_by_slug(&self, slug: &str) -> Result<Option<BlogWithAuthor>> {
        let tables = self.tables.read().await;
        tables
            .blogs
            .iter()
            .find(|b| b.slug == slug)
            .map(|b| tables.with_author(b))
            .transpose()
    }

    async fn list_blogs(&self, page: Page) -> Result<Vec<BlogWithAuthor>> {
        let tables = self.tables.read().await;
        tables
            .blogs
            .iter()
            .skip(page.skip.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .map(|b| tables.with_author(b))
            .collect()
    }

    async fn count_blogs(&self) -> Result<i64> {
        Ok(self.tables.read().await.blogs.len() as i64)
    }

    async fn increment_visit_count(&self, slug: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.blogs.iter_mut().find(|b| b.slug == slug) {
            Some(blog) => {
                blog.visit_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn toggle_featured(&self, blog_id: i64) -> Result<Option<Blog>> {
        let mut tables = self.tables.write().await;
        Ok(tables.blogs.iter_mut().find(|b| b.id == blog_id).map(|blog| {
            blog.is_featured = !blog.is_featured;
            blog.updated_at = Utc::now();
            blog.clone()
        }))
    }

    async fn delete_blog(&self, blog_id: i64, user_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.blogs.len();
        tables
            .blogs
            .retain(|b| !(b.id == blog_id && b.user_id == user_id));
        Ok(tables.blogs.len() < before)
    }

    async fn list_comments(&self) -> Result<Vec<Comment>> {
        Ok(self.tables.read().await.comments.clone())
    }

    async fn list_blog_comments(&self, blog_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let tables = self.tables.read().await;
        // Insertion order reversed gives newest first
        tables
            .comments
            .iter()
            .rev()
            .filter(|c| c.blog_id == blog_id)
            .map(|c| {
                Ok(CommentWithAuthor {
                    comment: c.clone(),
                    author: tables.author_of(c.user_id)?,
                })
            })
            .collect()
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        let mut tables = self.tables.write().await;

        if tables.user(comment.user_id).is_none() {
            return Err(DatabaseError::IntegrityError(format!(
                "user {} does not exist",
                comment.user_id
            )));
        }

        let now = Utc::now();
        let created = Comment {
            id: tables.next_id(),
            user_id: comment.user_id,
            blog_id: comment.blog_id,
            body: comment.body.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(created.clone());
        Ok(created)
    }

    async fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables
            .comments
            .retain(|c| !(c.id == comment_id && c.user_id == user_id));
        Ok(tables.comments.len() < before)
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
