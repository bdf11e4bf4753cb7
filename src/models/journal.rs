use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJournalEntryRequest {
    #[validate(length(min = 1, max = 20000, message = "Entry must be 1-20000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetJournalPinRequest {
    /// Required when a PIN is already set.
    pub current_pin: Option<String>,
    #[validate(length(min = 4, max = 8, message = "PIN must be 4-8 digits"))]
    pub new_pin: String,
}

/// Reflective analysis of one journal entry. Not medical advice; the
/// disclaimer lives in the UI layer.
#[derive(Debug, Serialize, Deserialize)]
pub struct JournalInsight {
    pub tone: String,
    #[serde(default)]
    pub themes: Vec<String>,
    pub reflection: String,
    #[serde(default)]
    pub source: String, // "gemini" or "fallback"
}
