use serde::{Deserialize, Serialize};

use super::records::BlogWithAuthor;

/// POST /blogs/create body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogPayload {
    pub clerk_user_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub desc: Option<String>,
    pub cover_img: Option<String>,
}

/// Body carrying only the caller's identity (blog and comment deletion)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerPayload {
    pub clerk_user_id: Option<String>,
}

/// PATCH /blogs/featured body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureBlogPayload {
    pub clerk_user_id: Option<String>,
    pub blog_id: Option<i64>,
}

/// PATCH /users/save body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBlogPayload {
    pub clerk_user_id: Option<String>,
    pub blog_id: Option<i64>,
}

/// POST /comments body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentPayload {
    pub clerk_user_id: Option<String>,
    pub blog_id: Option<i64>,
    pub desc: Option<String>,
}

/// GET /blogs/list query. Values are parsed leniently: anything that is not a
/// positive integer falls back to the default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBlogsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// GET /users/saved query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBlogsQuery {
    pub clerk_user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListResponse {
    pub blog_list: Vec<BlogWithAuthor>,
    pub has_more: bool,
}

/// Envelope for 201 responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Response to the identity-provider webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

/// Client-side image upload credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAuthResponse {
    pub token: String,
    pub expire: i64,
    pub signature: String,
}
