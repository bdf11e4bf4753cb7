use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::models::journal::{
    CreateJournalEntryRequest, JournalEntry, JournalInsight, SetJournalPinRequest,
};
use crate::AppState;

const PIN_HEADER: &str = "x-journal-pin";

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateJournalEntryRequest>,
) -> AppResult<Json<JournalEntry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if body.content.trim().is_empty() {
        return Err(AppError::Validation("Entry cannot be empty".into()));
    }

    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO journal_entries (id, user_id, content)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.content)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(entry))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<JournalEntry>>> {
    require_pin_if_set(&state, auth_user.id, &headers).await?;

    let entries = sqlx::query_as::<_, JournalEntry>(
        r#"
        SELECT * FROM journal_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

/// Set or change the journal PIN. Changing requires the current PIN; the
/// hash goes through argon2 like any password.
pub async fn set_pin(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SetJournalPinRequest>,
) -> AppResult<Json<serde_json::Value>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if !body.new_pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation("PIN must be digits only".into()));
    }

    let existing_hash = sqlx::query_scalar::<_, Option<String>>(
        "SELECT journal_pin_hash FROM users WHERE id = $1",
    )
    .bind(auth_user.id)
    .fetch_one(&state.db)
    .await?;

    if let Some(hash) = existing_hash {
        let current = body.current_pin.as_deref().ok_or(AppError::Forbidden)?;
        if !verify_password(current, &hash)? {
            return Err(AppError::Forbidden);
        }
    }

    let new_hash = hash_password(&body.new_pin)?;
    sqlx::query("UPDATE users SET journal_pin_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(auth_user.id)
        .bind(&new_hash)
        .execute(&state.db)
        .await?;

    Ok(Json(serde_json::json!({ "pin_set": true })))
}

pub async fn analyze_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
    headers: HeaderMap,
) -> AppResult<Json<JournalInsight>> {
    require_pin_if_set(&state, auth_user.id, &headers).await?;

    let entry = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal_entries WHERE id = $1 AND user_id = $2",
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Journal entry not found".into()))?;

    let prompt = format!(
        r#"You are a reflective assistant in a wellness app. Analyze the following journal entry from a user. Do not give medical advice or a diagnosis. Your response must be a JSON object with three keys: "tone" (a gentle summary of the emotional tone), "themes" (an array of 2-3 key topics mentioned), and "reflection" (one thoughtful, open-ended question to encourage self-reflection). Here is the user's entry: "{}""#,
        entry.content
    );

    let insight = match state.gemini.generate_json::<JournalInsight>(&prompt).await {
        Ok(mut insight) => {
            insight.source = "gemini".into();
            insight
        }
        Err(e) => {
            tracing::warn!(error = %e, "Gemini unavailable, using fallback insight");
            JournalInsight {
                tone: "Could not analyze this entry right now.".into(),
                themes: vec![],
                reflection: "What felt most important to you as you wrote this?".into(),
                source: "fallback".into(),
            }
        }
    };

    Ok(Json(insight))
}

/// Journal reads are PIN-gated once the user sets one: the request must
/// carry the PIN in the `X-Journal-Pin` header. Users without a PIN pass
/// through untouched.
async fn require_pin_if_set(
    state: &AppState,
    user_id: Uuid,
    headers: &HeaderMap,
) -> AppResult<()> {
    let pin_hash = sqlx::query_scalar::<_, Option<String>>(
        "SELECT journal_pin_hash FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_one(&state.db)
    .await?;

    let Some(hash) = pin_hash else {
        return Ok(());
    };

    let pin = headers
        .get(PIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Forbidden)?;

    if !verify_password(pin, &hash)? {
        return Err(AppError::Forbidden);
    }

    Ok(())
}
