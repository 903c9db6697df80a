use tracing::info;

use super::users::find_caller;
use super::DomainError;
use crate::db::BlogStore;
use crate::models::{Comment, CommentWithAuthor, NewComment};

pub async fn list_comments(store: &dyn BlogStore) -> Result<Vec<Comment>, DomainError> {
    Ok(store.list_comments().await?)
}

/// Comments of a blog with their authors, newest first
pub async fn list_blog_comments(
    store: &dyn BlogStore,
    blog_id: i64,
) -> Result<Vec<CommentWithAuthor>, DomainError> {
    Ok(store.list_blog_comments(blog_id).await?)
}

#[tracing::instrument(skip(store, body))]
pub async fn create_comment(
    store: &dyn BlogStore,
    clerk_user_id: &str,
    blog_id: i64,
    body: &str,
) -> Result<Comment, DomainError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(DomainError::Validation("Comment text is required.".to_string()));
    }

    let user = find_caller(store, clerk_user_id).await?;

    if store.find_blog_by_id(blog_id).await?.is_none() {
        return Err(DomainError::NotFound("Blog not found.".to_string()));
    }

    let comment = store
        .insert_comment(&NewComment {
            user_id: user.id,
            blog_id,
            body: body.to_string(),
        })
        .await?;

    info!(comment_id = comment.id, blog_id, "Created comment");
    Ok(comment)
}

/// Delete one of the caller's own comments
#[tracing::instrument(skip(store))]
pub async fn delete_comment(
    store: &dyn BlogStore,
    clerk_user_id: &str,
    comment_id: i64,
) -> Result<(), DomainError> {
    let user = find_caller(store, clerk_user_id).await?;

    if !store.delete_comment(comment_id, user.id).await? {
        return Err(DomainError::NotFound(
            "Comment not found or you are not authorized to delete it.".to_string(),
        ));
    }

    Ok(())
}
