use tracing::info;

use super::DomainError;
use crate::db::BlogStore;
use crate::models::User;

/// Resolve the local user behind an external identity key
pub async fn find_caller(store: &dyn BlogStore, clerk_user_id: &str) -> Result<User, DomainError> {
    store
        .find_user_by_clerk_id(clerk_user_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("User not found.".to_string()))
}

/// Saved blog ids of the caller, in the order they were saved
#[tracing::instrument(skip(store))]
pub async fn saved_blogs(store: &dyn BlogStore, clerk_user_id: &str) -> Result<Vec<i64>, DomainError> {
    Ok(find_caller(store, clerk_user_id).await?.saved_blogs)
}

/// Append a blog to the caller's saved list. Saving the same blog twice is a
/// conflict and leaves the list unchanged.
#[tracing::instrument(skip(store))]
pub async fn save_blog(
    store: &dyn BlogStore,
    clerk_user_id: &str,
    blog_id: i64,
) -> Result<(), DomainError> {
    let user = find_caller(store, clerk_user_id).await?;

    if store.find_blog_by_id(blog_id).await?.is_none() {
        return Err(DomainError::NotFound("Blog not found.".to_string()));
    }

    if !store.append_saved_blog(user.id, blog_id).await? {
        return Err(DomainError::Conflict("Blog is already saved.".to_string()));
    }

    info!(user_id = user.id, blog_id, "Saved blog");
    Ok(())
}
