use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use tracing::info;

use super::{optional_json, require_blog_id};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::server::AppState;
use crate::auth::{caller_identity, upload_auth_parameters};
use crate::domain::{self, BlogDraft};
use crate::models::{
    Blog, BlogListResponse, BlogWithAuthor, CallerPayload, CreateBlogPayload, CreatedResponse,
    FeatureBlogPayload, ListBlogsQuery, MessageResponse, UploadAuthResponse,
};

/// Lenient query number: anything but an integer is treated as absent
fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
}

pub async fn upload_auth_handler(State(state): State<AppState>) -> ApiResult<Json<UploadAuthResponse>> {
    let imagekit = state.config.imagekit.as_ref().ok_or_else(|| {
        ApiError::Internal("ImageKit service is not properly configured.".to_string())
    })?;

    Ok(Json(upload_auth_parameters(imagekit, Utc::now().timestamp())?))
}

#[tracing::instrument(skip(state))]
pub async fn list_blogs_handler(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListBlogsQuery>,
) -> ApiResult<Json<BlogListResponse>> {
    let page = domain::list_blogs(
        state.store.as_ref(),
        parse_number(query.page.as_deref()),
        parse_number(query.limit.as_deref()),
    )
    .await?;

    Ok(Json(BlogListResponse {
        blog_list: page.blogs,
        has_more: page.has_more,
    }))
}

#[tracing::instrument(skip(state))]
pub async fn read_blog_handler(
    State(state): State<AppState>,
    AppPath(slug): AppPath<String>,
) -> ApiResult<Json<BlogWithAuthor>> {
    Ok(Json(domain::read_blog(state.store.as_ref(), &slug).await?))
}

#[tracing::instrument(skip(state, headers, payload))]
pub async fn create_blog_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<CreateBlogPayload>,
) -> ApiResult<(StatusCode, Json<CreatedResponse<Blog>>)> {
    let caller = caller_identity(&headers, payload.clerk_user_id.as_deref())?;

    let draft = BlogDraft {
        title: payload.title.unwrap_or_default(),
        content: payload.content.unwrap_or_default(),
        category: payload.category,
        description: payload.desc,
        cover_img: payload.cover_img,
    };

    let blog = domain::create_blog(state.store.as_ref(), &caller, draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            success: true,
            data: blog,
            message: Some("Blog created successfully".to_string()),
        }),
    ))
}

#[tracing::instrument(skip(state, headers, body))]
pub async fn delete_blog_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    let payload: CallerPayload = optional_json(&body)?;
    let caller = caller_identity(&headers, payload.clerk_user_id.as_deref())?;

    domain::delete_blog(state.store.as_ref(), &caller, id).await?;

    Ok(Json(MessageResponse::ok("Blog deleted successfully")))
}

#[tracing::instrument(skip(state, headers, payload))]
pub async fn toggle_featured_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<FeatureBlogPayload>,
) -> ApiResult<Json<Blog>> {
    let caller = caller_identity(&headers, payload.clerk_user_id.as_deref())?;
    let blog_id = require_blog_id(payload.blog_id)?;

    let blog = domain::toggle_featured(
        state.store.as_ref(),
        &caller,
        blog_id,
        &state.config.admin_user_ids,
    )
    .await?;

    info!(blog_id, is_featured = blog.is_featured, "Featured flag updated");
    Ok(Json(blog))
}
