use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::db::errors::Result;
use crate::db::store::{BlogStore, Page};
use crate::models::{
    Blog, BlogWithAuthor, Comment, CommentWithAuthor, NewBlog, NewComment, NewUser, User,
};

const USER_COLUMNS: &str = r#"
    id, clerk_user_id, username, email, img, saved_blogs, created_at, updated_at
"#;

const BLOG_COLUMNS: &str = r#"
    id, user_id, title, slug, category, description, content, cover_img,
    is_featured, visit_count, created_at, updated_at
"#;

const BLOG_WITH_AUTHOR_SELECT: &str = r#"
    SELECT
        b.id, b.user_id, b.title, b.slug, b.category, b.description, b.content,
        b.cover_img, b.is_featured, b.visit_count, b.created_at, b.updated_at,
        u.username AS author_username,
        u.img AS author_img
    FROM blogs b
    JOIN users u ON u.id = b.user_id
"#;

const COMMENT_COLUMNS: &str = "id, user_id, blog_id, body, created_at, updated_at";

/// Postgres-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlogStore for PgStore {
    #[tracing::instrument(skip(self))]
    async fn find_user_by_clerk_id(&self, clerk_user_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE clerk_user_id = $1",
            USER_COLUMNS
        ))
        .bind(clerk_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self, user), fields(clerk_user_id = %user.clerk_user_id))]
    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (clerk_user_id, username, email, img, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.clerk_user_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.img)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted user with ID: {}", created.id);
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    async fn append_saved_blog(&self, user_id: i64, blog_id: i64) -> Result<bool> {
        // Membership check and append happen in one statement so concurrent
        // saves cannot both succeed
        let result = sqlx::query(
            r#"
            UPDATE users
            SET saved_blogs = array_append(saved_blogs, $2),
                updated_at = NOW()
            WHERE id = $1
                AND NOT ($2 = ANY(saved_blogs))
            "#,
        )
        .bind(user_id)
        .bind(blog_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM blogs WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        debug!(exists, "Probed slug");
        Ok(exists)
    }

    #[tracing::instrument(skip(self, blog), fields(slug = %blog.slug, user_id = blog.user_id))]
    async fn insert_blog(&self, blog: &NewBlog) -> Result<Blog> {
        let created = sqlx::query_as::<_, Blog>(&format!(
            r#"
            INSERT INTO blogs (
                user_id, title, slug, category, description, content, cover_img,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING {}
            "#,
            BLOG_COLUMNS
        ))
        .bind(blog.user_id)
        .bind(&blog.title)
        .bind(&blog.slug)
        .bind(&blog.category)
        .bind(&blog.description)
        .bind(&blog.content)
        .bind(&blog.cover_img)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted blog with ID: {}", created.id);
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    async fn find_blog_by_id(&self, blog_id: i64) -> Result<Option<Blog>> {
        let blog = sqlx::query_as::<_, Blog>(&format!(
            "SELECT {} FROM blogs WHERE id = $1",
            BLOG_COLUMNS
        ))
        .bind(blog_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(blog)
    }

    #[tracing::instrument(skip(self))]
    async fn find_blog_by_slug(&self, slug: &str) -> Result<Option<BlogWithAuthor>> {
        let blog = sqlx::query_as::<_, BlogWithAuthor>(&format!(
            "{} WHERE b.slug = $1",
            BLOG_WITH_AUTHOR_SELECT
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(blog)
    }

    #[tracing::instrument(skip(self))]
    async fn list_blogs(&self, page: Page) -> Result<Vec<BlogWithAuthor>> {
        let blogs = sqlx::query_as::<_, BlogWithAuthor>(&format!(
            "{} ORDER BY b.id LIMIT $1 OFFSET $2",
            BLOG_WITH_AUTHOR_SELECT
        ))
        .bind(page.limit)
        .bind(page.skip)
        .fetch_all(&self.pool)
        .await?;

        debug!("Loaded {} blogs", blogs.len());
        Ok(blogs)
    }

    async fn count_blogs(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blogs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[tracing::instrument(skip(self))]
    async fn increment_visit_count(&self, slug: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE blogs SET visit_count = visit_count + 1 WHERE slug = $1",
        )
        .bind(slug)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn toggle_featured(&self, blog_id: i64) -> Result<Option<Blog>> {
        let blog = sqlx::query_as::<_, Blog>(&format!(
            r#"
            UPDATE blogs
            SET is_featured = NOT is_featured,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            BLOG_COLUMNS
        ))
        .bind(blog_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(blog)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_blog(&self, blog_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1 AND user_id = $2")
            .bind(blog_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!("Deleted {} blogs", result.rows_affected());
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {} FROM comments ORDER BY id",
            COMMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    #[tracing::instrument(skip(self))]
    async fn list_blog_comments(&self, blog_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT
                c.id, c.user_id, c.blog_id, c.body, c.created_at, c.updated_at,
                u.username AS author_username,
                u.img AS author_img
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.blog_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(blog_id)
        .fetch_all(&self.pool)
        .await?;

        debug!("Loaded {} comments for blog {}", comments.len(), blog_id);
        Ok(comments)
    }

    #[tracing::instrument(skip(self, comment), fields(blog_id = comment.blog_id, user_id = comment.user_id))]
    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        let created = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (user_id, blog_id, body, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(comment.user_id)
        .bind(comment.blog_id)
        .bind(&comment.body)
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted comment with ID: {}", created.id);
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
            .bind(comment_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<()> {
        crate::db::connection::health_check(&self.pool).await
    }
}
