//! Database row types — these map directly to SQLite rows.
//! Distinct from the tend-types API models to keep the store independent.

use chrono::{DateTime, NaiveDate, Utc};

use tend_types::domain::{CommitmentStatus, Frequency, RecurrencePattern};

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

pub struct HabitRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub frequency: Frequency,
    pub reminder_time: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct HabitLogRow {
    pub id: String,
    pub habit_id: String,
    pub completed_at: DateTime<Utc>,
}

pub struct CommitmentRow {
    pub id: String,
    pub user_id: String,
    pub task_description: String,
    pub deadline: Option<NaiveDate>,
    pub status: CommitmentStatus,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub original_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

pub struct CheckInRow {
    pub id: String,
    pub user_id: String,
    pub mood: u8,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub struct ConversationRow {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

pub struct ProfileRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub pronouns: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct PersonRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub pronouns: Option<String>,
    pub description: Option<String>,
    pub how_known: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
