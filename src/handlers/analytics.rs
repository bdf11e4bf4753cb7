use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::mood::{Mood, MoodQuery};
use crate::AppState;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StressTrendEntry {
    pub date: NaiveDate,
    pub avg_stress: f64,
    pub entry_count: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct MoodDistributionEntry {
    pub mood: Mood,
    pub count: i64,
}

/// Average stress per day over the last 7 days, one row per day that has
/// at least one entry. Feeds the dashboard bar chart.
pub async fn stress_trend(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<StressTrendEntry>>> {
    let today = Utc::now().date_naive();
    let week_ago = today - chrono::Duration::days(6);

    let entries = sqlx::query_as::<_, StressTrendEntry>(
        r#"
        SELECT created_at::date AS date,
               AVG(stress_level)::float AS avg_stress,
               COUNT(*) AS entry_count
        FROM mood_entries
        WHERE user_id = $1 AND created_at::date BETWEEN $2 AND $3
        GROUP BY created_at::date
        ORDER BY date ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(week_ago)
    .bind(today)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

/// Count per mood over a date range (default last 30 days). Feeds the
/// dashboard pie chart.
pub async fn mood_distribution(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodQuery>,
) -> AppResult<Json<Vec<MoodDistributionEntry>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let entries = sqlx::query_as::<_, MoodDistributionEntry>(
        r#"
        SELECT mood, COUNT(*) AS count
        FROM mood_entries
        WHERE user_id = $1 AND created_at::date BETWEEN $2 AND $3
        GROUP BY mood
        ORDER BY count DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}
