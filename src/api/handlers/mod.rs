// API handlers - thin HTTP orchestration layer
// Handlers only deal with HTTP concerns:
// 1. Extract parameters from request
// 2. Resolve the caller's identity
// 3. Call domain logic
// 4. Transform domain result to HTTP response

pub mod blogs;
pub mod comments;
pub mod users;
pub mod webhooks;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::api::error::{ApiError, ApiResult};

/// Parse a JSON body that clients may omit entirely
pub(crate) fn optional_json<T>(body: &Bytes) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

pub(crate) fn require_blog_id(blog_id: Option<i64>) -> ApiResult<i64> {
    blog_id.ok_or_else(|| ApiError::Validation("Blog ID is required.".to_string()))
}
