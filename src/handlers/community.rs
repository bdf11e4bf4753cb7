use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::core::reactions::{self, ReactionSet};
use crate::error::{AppError, AppResult};
use crate::models::post::{
    Comment, CreateCommentRequest, CreatePostRequest, Post, PostView, ReactRequest,
    ReactionSummary,
};
use crate::AppState;

pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreatePostRequest>,
) -> AppResult<Json<Post>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (id, author_id, title, body, agree_user_ids, disagree_user_ids)
        VALUES ($1, $2, $3, $4, '{}', '{}')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.body)
    .fetch_one(&state.db)
    .await?;

    // Community events have no user_id field, so they fan out to everyone.
    if let Some(tx) = state.ws_tx.as_ref() {
        let msg = serde_json::json!({
            "type": "post_created",
            "post_id": post.id,
        });
        let _ = tx.send(msg.to_string());
    }

    Ok(Json(post))
}

pub async fn list_posts(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<PostView>>> {
    let rows = sqlx::query_as::<_, PostRow>(
        r#"
        SELECT p.*, u.name AS author_name,
               (SELECT COUNT(*) FROM post_comments c WHERE c.post_id = p.id) AS comment_count
        FROM posts p
        JOIN users u ON u.id = p.author_id
        ORDER BY p.created_at DESC
        LIMIT 100
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let views = rows
        .into_iter()
        .map(|row| {
            let reactions = ReactionSet::from_arrays(
                row.agree_user_ids.clone(),
                row.disagree_user_ids.clone(),
            );
            PostView {
                id: row.id,
                author_id: row.author_id,
                author_name: row.author_name,
                title: row.title,
                body: row.body,
                agree_count: row.agree_user_ids.len() as i64,
                disagree_count: row.disagree_user_ids.len() as i64,
                my_reaction: reactions.reaction_of(auth_user.id),
                comment_count: row.comment_count,
                created_at: row.created_at,
            }
        })
        .collect();

    Ok(Json(views))
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    author_name: String,
    title: Option<String>,
    body: String,
    agree_user_ids: Vec<Uuid>,
    disagree_user_ids: Vec<Uuid>,
    comment_count: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// One agree/disagree click. The membership arrays are read back under a
/// row lock immediately before the transition is computed, so two
/// concurrent clicks on the same post serialize; neither is lost, and the
/// reader never observes a state where a user is in both sets.
pub async fn react_to_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
    Json(body): Json<ReactRequest>,
) -> AppResult<Json<ReactionSummary>> {
    let mut tx = state.db.begin().await?;

    let row = sqlx::query_as::<_, (Vec<Uuid>, Vec<Uuid>)>(
        r#"
        SELECT agree_user_ids, disagree_user_ids FROM posts
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(post_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Post not found".into()))?;

    let prior = ReactionSet::from_arrays(row.0, row.1);
    let next = reactions::toggle(&prior, auth_user.id, body.kind);

    let agree: Vec<Uuid> = next.agree.iter().copied().collect();
    let disagree: Vec<Uuid> = next.disagree.iter().copied().collect();

    sqlx::query(
        r#"
        UPDATE posts SET agree_user_ids = $2, disagree_user_ids = $3
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .bind(&agree)
    .bind(&disagree)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    if let Some(ws) = state.ws_tx.as_ref() {
        let msg = serde_json::json!({
            "type": "reactions_changed",
            "post_id": post_id,
            "agree_count": agree.len(),
            "disagree_count": disagree.len(),
        });
        let _ = ws.send(msg.to_string());
    }

    Ok(Json(ReactionSummary {
        post_id,
        agree_count: agree.len() as i64,
        disagree_count: disagree.len() as i64,
        my_reaction: next.reaction_of(auth_user.id),
    }))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
        .bind(post_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Post not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
    Json(body): Json<CreateCommentRequest>,
) -> AppResult<Json<Comment>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_one(&state.db)
        .await?;
    if exists == 0 {
        return Err(AppError::NotFound("Post not found".into()));
    }

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO post_comments (id, post_id, author_id, body)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(post_id)
    .bind(auth_user.id)
    .bind(&body.body)
    .fetch_one(&state.db)
    .await?;

    if let Some(ws) = state.ws_tx.as_ref() {
        let msg = serde_json::json!({
            "type": "comment_created",
            "post_id": post_id,
            "comment_id": comment.id,
        });
        let _ = ws.send(msg.to_string());
    }

    Ok(Json(comment))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<Vec<Comment>>> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT * FROM post_comments
        WHERE post_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(comments))
}
