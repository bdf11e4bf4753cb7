use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::core::streak::{self, UserStreak};
use crate::error::{AppError, AppResult};
use crate::models::mood::{LogMoodRequest, MoodEntry, MoodQuery, MoodSuggestion};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LogMoodResponse {
    pub entry: MoodEntry,
    pub streak: UserStreak,
    pub suggestion: MoodSuggestion,
}

pub async fn log_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<LogMoodRequest>,
) -> AppResult<Json<LogMoodResponse>> {
    if !(0..=10).contains(&body.stress_level) {
        return Err(AppError::Validation(
            "Stress level must be between 0 and 10".into(),
        ));
    }

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, mood, stress_level, note)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.mood)
    .bind(body.stress_level)
    .bind(&body.note)
    .fetch_one(&state.db)
    .await?;

    // Streak dates are UTC calendar days, everywhere.
    let today = Utc::now().date_naive();
    let streak = advance_streak(&state, auth_user.id, today).await?;

    if let Some(tx) = state.ws_tx.as_ref() {
        let msg = serde_json::json!({
            "type": "streak_changed",
            "user_id": auth_user.id,
            "current_streak": streak.current_streak,
            "longest_streak": streak.longest_streak,
        });
        let _ = tx.send(msg.to_string());
    }

    let suggestion = suggest_activity(&state, &body).await;

    Ok(Json(LogMoodResponse {
        entry,
        streak,
        suggestion,
    }))
}

/// Read-compute-write of the streak row under a row lock, so two entries
/// logged at the same moment serialize instead of clobbering each other.
/// The row is locked before the prior state is read, never after.
async fn advance_streak(
    state: &AppState,
    user_id: Uuid,
    event_date: chrono::NaiveDate,
) -> AppResult<UserStreak> {
    let mut tx = state.db.begin().await?;

    let prior = sqlx::query_as::<_, UserStreak>(
        r#"
        SELECT current_streak, longest_streak, last_logged_date
        FROM streaks WHERE user_id = $1
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .unwrap_or_default();

    let next = streak::update(&prior, event_date);

    if next != prior {
        sqlx::query(
            r#"
            INSERT INTO streaks (user_id, current_streak, longest_streak, last_logged_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                current_streak = $2,
                longest_streak = $3,
                last_logged_date = $4,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(next.current_streak)
        .bind(next.longest_streak)
        .bind(next.last_logged_date)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(next)
}

async fn suggest_activity(state: &AppState, body: &LogMoodRequest) -> MoodSuggestion {
    let prompt = format!(
        r#"A user in a mental wellness app feels "{}" with a stress level of {}/10. Their note is: "{}". Provide one simple, safe, non-medical, actionable suggestion for an activity to help them, encouraging and empathetic in tone. Respond with a JSON object with two keys: "title" (a short, catchy title) and "content" (a 2-3 sentence description)."#,
        body.mood.label(),
        body.stress_level,
        body.note.as_deref().unwrap_or(""),
    );

    match state.gemini.generate_json::<MoodSuggestion>(&prompt).await {
        Ok(mut suggestion) => {
            suggestion.source = "gemini".into();
            suggestion
        }
        Err(e) => {
            tracing::warn!(error = %e, "Gemini unavailable, using fallback suggestion");
            MoodSuggestion {
                title: "A Moment for You".into(),
                content: "Take a brief pause. Step away from your screen, stretch, or listen \
                          to a favorite song. Sometimes a small break is all you need."
                    .into(),
                source: "fallback".into(),
            }
        }
    }
}

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodQuery>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1 AND created_at::date BETWEEN $2 AND $3
        ORDER BY created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserStreak>> {
    let streak = sqlx::query_as::<_, UserStreak>(
        r#"
        SELECT current_streak, longest_streak, last_logged_date
        FROM streaks WHERE user_id = $1
        "#,
    )
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .unwrap_or_default();

    Ok(Json(streak))
}
