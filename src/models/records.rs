use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// users table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub clerk_user_id: String,
    pub username: String,
    pub email: Option<String>,
    pub img: String,
    #[serde(rename = "saveBlogs")]
    pub saved_blogs: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// blogs table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: i64,
    #[serde(rename = "user")]
    pub user_id: i64,
    pub title: String,
    pub slug: String,
    pub category: String,
    #[serde(rename = "desc")]
    pub description: Option<String>,
    pub content: String,
    pub cover_img: String,
    pub is_featured: bool,
    pub visit_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// comments table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    #[serde(rename = "user")]
    pub user_id: i64,
    #[serde(rename = "blog")]
    pub blog_id: i64,
    #[serde(rename = "desc")]
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public slice of a user embedded in blog and comment listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AuthorSummary {
    #[sqlx(rename = "author_username")]
    pub username: String,
    #[sqlx(rename = "author_img")]
    pub img: String,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            img: user.img.clone(),
        }
    }
}

/// Blog joined with its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BlogWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub blog: Blog,
    #[sqlx(flatten)]
    pub author: AuthorSummary,
}

/// Comment joined with its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CommentWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,
    #[sqlx(flatten)]
    pub author: AuthorSummary,
}

/// Insert payload for users
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub clerk_user_id: String,
    pub username: String,
    pub email: Option<String>,
    pub img: String,
}

/// Insert payload for blogs; `slug` must already be allocated
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlog {
    pub user_id: i64,
    pub title: String,
    pub slug: String,
    pub category: String,
    pub description: Option<String>,
    pub content: String,
    pub cover_img: String,
}

/// Insert payload for comments
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub user_id: i64,
    pub blog_id: i64,
    pub body: String,
}
