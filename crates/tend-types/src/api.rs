use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CommitmentStatus, Frequency, RecurrencePattern};

// -- JWT Claims --

/// JWT claims shared between the REST middleware and the auth handlers.
/// Canonical definition lives here in tend-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// -- Habits --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HabitRequest {
    pub name: String,
    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
    pub reminder_time: Option<String>,
}

fn default_frequency() -> Frequency {
    Frequency::Daily
}

#[derive(Debug, Serialize)]
pub struct HabitResponse {
    pub id: Uuid,
    pub name: String,
    pub frequency: Frequency,
    pub reminder_time: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub completed_today: bool,
    pub current_streak: u32,
}

#[derive(Debug, Serialize)]
pub struct HabitLogResponse {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub completed_at: DateTime<Utc>,
    /// True when the period already had a countable completion and this
    /// call wrote nothing.
    pub already_logged: bool,
}

#[derive(Debug, Serialize)]
pub struct HabitStatsResponse {
    pub habit_id: Uuid,
    pub total_completions: u32,
    pub current_streak: u32,
    pub completed_today: bool,
}

// -- Commitments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitmentCreateRequest {
    pub task_description: String,
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub original_message: Option<String>,
}

/// Partial patch: absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitmentUpdateRequest {
    pub task_description: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub is_recurring: Option<bool>,
    pub recurrence_pattern: Option<RecurrencePattern>,
}

#[derive(Debug, Serialize)]
pub struct CommitmentResponse {
    pub id: Uuid,
    pub task_description: String,
    pub deadline: Option<NaiveDate>,
    pub status: CommitmentStatus,
    /// Derived at read time: pending with a deadline in the past.
    pub overdue: bool,
    pub due_today: bool,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub original_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// -- Check-ins --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckInRequest {
    pub mood: u8,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub id: Uuid,
    pub mood: u8,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// -- Analytics --

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub habits_completed_today: u32,
    pub commitments_completed_today: u32,
    pub longest_streak: u32,
    /// Today's most recent check-in, null when today has none.
    pub current_mood: Option<u8>,
    pub total_conversations: u64,
}

#[derive(Debug, Serialize)]
pub struct HabitAnalytics {
    pub habit_id: Uuid,
    pub habit_name: String,
    pub total_completions: u32,
    pub total_eligible_days: u32,
    /// Whole percent in [0, 100]; exactly 0 when no eligible days.
    pub completion_rate: u8,
    pub current_streak: u32,
}

#[derive(Debug, Serialize)]
pub struct HabitAnalyticsResponse {
    pub days: u32,
    pub habits: Vec<HabitAnalytics>,
}

#[derive(Debug, Serialize)]
pub struct CommitmentAnalyticsResponse {
    pub days: u32,
    pub total_created: u32,
    pub total_completed: u32,
    pub currently_overdue: u32,
    pub completion_rate: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MoodTrendPoint {
    pub date: NaiveDate,
    pub mood: u8,
}

#[derive(Debug, Serialize)]
pub struct MoodAnalyticsResponse {
    pub days: u32,
    pub average_mood: Option<f64>,
    pub trend: Vec<MoodTrendPoint>,
}

// -- Profile / People --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileRequest {
    pub name: String,
    pub pronouns: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub pronouns: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonRequest {
    pub name: String,
    pub pronouns: Option<String>,
    pub description: Option<String>,
    pub how_known: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonResponse {
    pub id: Uuid,
    pub name: String,
    pub pronouns: Option<String>,
    pub description: Option<String>,
    pub how_known: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Chat --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatRequest {
    pub message: String,
}

/// Structured side effect the assistant performed on the caller's behalf.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatAction {
    CommitmentCreated {
        id: Uuid,
        task_description: String,
        deadline: Option<NaiveDate>,
    },
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
    pub actions: Vec<ChatAction>,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}
