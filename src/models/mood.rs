use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: Mood,
    pub stress_level: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "mood_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Calm,
    Okay,
    Sad,
    Anxious,
    Angry,
}

impl Mood {
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Calm => "Calm",
            Mood::Okay => "Okay",
            Mood::Sad => "Sad",
            Mood::Anxious => "Anxious",
            Mood::Angry => "Angry",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogMoodRequest {
    pub mood: Mood,
    pub stress_level: i32,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Short non-medical activity suggestion shown after a mood log.
#[derive(Debug, Serialize, Deserialize)]
pub struct MoodSuggestion {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub source: String, // "gemini" or "fallback"
}
