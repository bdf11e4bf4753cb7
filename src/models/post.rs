use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::core::reactions::ReactionKind;

/// A community post row. The two uuid[] columns mirror the document shape
/// the original frontend subscribed to; mutual exclusion between them is
/// maintained by `core::reactions::toggle`, never by handlers directly.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: Option<String>,
    pub body: String,
    pub agree_user_ids: Vec<Uuid>,
    pub disagree_user_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(max = 200, message = "Title too long"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10000, message = "Post body must be 1-10000 characters"))]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    pub kind: ReactionKind,
}

/// Post as listed in the feed: counts instead of raw membership arrays,
/// plus the caller's own reaction so the UI can highlight the button.
#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub title: Option<String>,
    pub body: String,
    pub agree_count: i64,
    pub disagree_count: i64,
    pub my_reaction: Option<ReactionKind>,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ReactionSummary {
    pub post_id: Uuid,
    pub agree_count: i64,
    pub disagree_count: i64,
    pub my_reaction: Option<ReactionKind>,
}
