use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub source: String, // "gemini" or "fallback"
}

#[derive(Debug, Serialize)]
pub struct ThoughtResponse {
    pub thought: String,
    pub source: String,
}

/// One turn of the supportive chat. The bot is framed as a companion, not
/// a therapist; if the model is unreachable the user gets a gentle canned
/// reply rather than an error.
pub async fn chat(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    if body.message.trim().is_empty() {
        return Err(AppError::Validation("Message cannot be empty".into()));
    }
    if body.message.len() > 4000 {
        return Err(AppError::Validation("Message too long".into()));
    }

    let prompt = format!(
        r#"You are a kind, empathetic, and motivational AI assistant for a mental wellness app called EaseHaven. Your goal is to provide supportive, helpful, and safe conversations. You are not a licensed therapist. Keep responses concise, positive, and encouraging. User's message: "{}""#,
        body.message
    );

    let response = match state.gemini.generate(&prompt).await {
        Ok(reply) => ChatResponse {
            reply,
            source: "gemini".into(),
        },
        Err(e) => {
            tracing::warn!(user_id = %auth_user.id, error = %e, "Gemini unavailable for chat");
            ChatResponse {
                reply: "I'm having a little trouble connecting. Please try again.".into(),
                source: "fallback".into(),
            }
        }
    };

    Ok(Json(response))
}

pub async fn thought_of_the_day(
    State(state): State<AppState>,
) -> AppResult<Json<ThoughtResponse>> {
    let prompt = "Provide a short, uplifting, and motivational 'thought of the day' for a \
                  user of a mental wellness app. It should be one or two sentences. Do not \
                  include quotation marks or any prefixes like 'Thought of the Day:'.";

    let response = match state.gemini.generate(prompt).await {
        Ok(thought) => ThoughtResponse {
            thought: thought.trim().to_string(),
            source: "gemini".into(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Gemini unavailable for thought of the day");
            ThoughtResponse {
                thought: "Every small step forward is still a step forward. Be proud of \
                          your progress."
                    .into(),
                source: "fallback".into(),
            }
        }
    };

    Ok(Json(response))
}
