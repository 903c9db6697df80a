use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};

use super::{optional_json, require_blog_id};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath};
use crate::api::server::AppState;
use crate::auth::caller_identity;
use crate::domain;
use crate::models::{
    CallerPayload, Comment, CommentWithAuthor, CreateCommentPayload, CreatedResponse,
    MessageResponse,
};

pub async fn list_comments_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(domain::list_comments(state.store.as_ref()).await?))
}

/// Comments of one blog, newest first
#[tracing::instrument(skip(state))]
pub async fn blog_comments_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Json<Vec<CommentWithAuthor>>> {
    Ok(Json(domain::list_blog_comments(state.store.as_ref(), id).await?))
}

#[tracing::instrument(skip(state, headers, payload))]
pub async fn create_comment_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<CreateCommentPayload>,
) -> ApiResult<(StatusCode, Json<CreatedResponse<Comment>>)> {
    let caller = caller_identity(&headers, payload.clerk_user_id.as_deref())?;
    let blog_id = require_blog_id(payload.blog_id)?;
    let body = payload
        .desc
        .ok_or_else(|| ApiError::Validation("Comment text is required.".to_string()))?;

    let comment = domain::create_comment(state.store.as_ref(), &caller, blog_id, &body).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            data: comment,
            message: None,
        }),
    ))
}

#[tracing::instrument(skip(state, headers, body))]
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    let payload: CallerPayload = optional_json(&body)?;
    let caller = caller_identity(&headers, payload.clerk_user_id.as_deref())?;

    domain::delete_comment(state.store.as_ref(), &caller, id).await?;

    Ok(Json(MessageResponse::ok("Comment deleted successfully")))
}
