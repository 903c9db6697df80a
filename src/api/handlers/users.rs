use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};

use super::require_blog_id;
use crate::api::error::ApiResult;
use crate::api::extract::{AppJson, AppQuery};
use crate::api::server::AppState;
use crate::auth::caller_identity;
use crate::domain;
use crate::models::{MessageResponse, SaveBlogPayload, SavedBlogsQuery};

#[tracing::instrument(skip(state, headers))]
pub async fn saved_blogs_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppQuery(query): AppQuery<SavedBlogsQuery>,
) -> ApiResult<Json<Vec<i64>>> {
    let caller = caller_identity(&headers, query.clerk_user_id.as_deref())?;
    Ok(Json(domain::saved_blogs(state.store.as_ref(), &caller).await?))
}

#[tracing::instrument(skip(state, headers, payload))]
pub async fn save_blog_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<SaveBlogPayload>,
) -> ApiResult<Json<MessageResponse>> {
    let caller = caller_identity(&headers, payload.clerk_user_id.as_deref())?;
    let blog_id = require_blog_id(payload.blog_id)?;

    domain::save_blog(state.store.as_ref(), &caller, blog_id).await?;

    Ok(Json(MessageResponse::ok("Blog saved successfully")))
}
