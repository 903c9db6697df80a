use tracing::{info, warn};

use super::slug::{allocate_slug, base_slug};
use super::users::find_caller;
use super::DomainError;
use crate::db::{with_retry, BlogStore, DatabaseError, Page, BLOG_SLUG_CONSTRAINT};
use crate::models::{Blog, BlogWithAuthor, NewBlog};

/// Allocate-and-insert attempts before giving up on a contended slug
pub const MAX_SLUG_ATTEMPTS: u8 = 5;
pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_PAGE_LIMIT: i64 = 2;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Caller-supplied fields of a new blog
#[derive(Debug, Clone, Default)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub cover_img: Option<String>,
}

/// One page of the blog listing
#[derive(Debug, Clone)]
pub struct BlogPage {
    pub blogs: Vec<BlogWithAuthor>,
    pub has_more: bool,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Create a blog owned by the caller under a freshly allocated slug.
///
/// Slug allocation and insert run together inside [`with_retry`]: when another
/// writer takes the probed slug first, the unique violation triggers a new
/// probe rather than failing the request.
#[tracing::instrument(skip(store, draft), fields(title = %draft.title))]
pub async fn create_blog(
    store: &dyn BlogStore,
    clerk_user_id: &str,
    draft: BlogDraft,
) -> Result<Blog, DomainError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(DomainError::Validation("Title is required.".to_string()));
    }
    if draft.content.trim().is_empty() {
        return Err(DomainError::Validation("Content is required.".to_string()));
    }
    let base = base_slug(title)?;

    let user = find_caller(store, clerk_user_id).await?;

    let template = NewBlog {
        user_id: user.id,
        title: title.to_string(),
        slug: String::new(),
        category: trimmed(draft.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        description: trimmed(draft.description),
        content: draft.content,
        cover_img: trimmed(draft.cover_img).unwrap_or_default(),
    };

    let base = base.as_str();
    let template = &template;
    let result = with_retry(MAX_SLUG_ATTEMPTS, move || async move {
        let slug = allocate_slug(store, base).await?;
        let new_blog = NewBlog {
            slug,
            ..template.clone()
        };
        store.insert_blog(&new_blog).await
    })
    .await;

    match result {
        Ok(blog) => {
            info!(blog_id = blog.id, slug = %blog.slug, "Created blog");
            Ok(blog)
        }
        // Only slug collisions are a conflict; exhausted retries on anything
        // else are a store failure
        Err(DatabaseError::RetryLimitExceeded { attempts, last_error })
            if last_error.is_unique_violation_on(BLOG_SLUG_CONSTRAINT) =>
        {
            warn!(attempts, base, "Could not settle on a free slug");
            Err(DomainError::Conflict(
                "Could not allocate a unique slug for this title, please retry.".to_string(),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// Paginated listing. `page` is 1-based; missing or non-positive values fall
/// back to the defaults and `limit` is capped.
#[tracing::instrument(skip(store))]
pub async fn list_blogs(
    store: &dyn BlogStore,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<BlogPage, DomainError> {
    let page = page.filter(|p| *p > 0).unwrap_or(1);
    let limit = limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .min(MAX_PAGE_LIMIT);

    let blogs = store.list_blogs(Page::new(page, limit)).await?;
    let total = store.count_blogs().await?;

    Ok(BlogPage {
        blogs,
        has_more: page.saturating_mul(limit) < total,
    })
}

/// Fetch a blog by slug, counting the visit
#[tracing::instrument(skip(store))]
pub async fn read_blog(store: &dyn BlogStore, slug: &str) -> Result<BlogWithAuthor, DomainError> {
    if !store.increment_visit_count(slug).await? {
        return Err(DomainError::NotFound("Blog not found".to_string()));
    }

    store
        .find_blog_by_slug(slug)
        .await?
        .ok_or_else(|| DomainError::NotFound("Blog not found".to_string()))
}

/// Delete one of the caller's own blogs. Comments of the blog are left in place.
#[tracing::instrument(skip(store))]
pub async fn delete_blog(
    store: &dyn BlogStore,
    clerk_user_id: &str,
    blog_id: i64,
) -> Result<(), DomainError> {
    let user = find_caller(store, clerk_user_id).await?;

    if !store.delete_blog(blog_id, user.id).await? {
        return Err(DomainError::NotFound(
            "Blog not found or you are not authorized to delete it.".to_string(),
        ));
    }

    info!(blog_id, user_id = user.id, "Deleted blog");
    Ok(())
}

/// Flip the featured flag. Allowed for the blog's owner and for the
/// configured administrators.
#[tracing::instrument(skip(store, admin_ids))]
pub async fn toggle_featured(
    store: &dyn BlogStore,
    clerk_user_id: &str,
    blog_id: i64,
    admin_ids: &[String],
) -> Result<Blog, DomainError> {
    let user = find_caller(store, clerk_user_id).await?;

    let blog = store
        .find_blog_by_id(blog_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Blog not found".to_string()))?;

    let is_admin = admin_ids.iter().any(|id| id == clerk_user_id);
    if blog.user_id != user.id && !is_admin {
        return Err(DomainError::Unauthorized(
            "Only the blog owner or an administrator can feature this blog.".to_string(),
        ));
    }

    let updated = store
        .toggle_featured(blog_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Blog not found".to_string()))?;

    info!(blog_id, is_featured = updated.is_featured, "Toggled featured flag");
    Ok(updated)
}
