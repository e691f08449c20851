//! Pure domain logic: the eligible-period calendar, streak and
//! completion-rate math, commitment classification and display ordering.
//! Everything here is a function of its inputs — no I/O, no clocks.

pub mod analytics;
pub mod commitment;
pub mod period;

use chrono::NaiveTime;
use thiserror::Error;

/// Domain validation failures, surfaced at the API boundary as 400s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("mood must be an integer between 1 and 5")]
    MoodOutOfRange,
    #[error("task description must not be empty")]
    EmptyTaskDescription,
    #[error("a recurring commitment requires a recurrence pattern")]
    RecurringWithoutPattern,
    #[error("habit name must not be empty")]
    EmptyHabitName,
    #[error("reminder time must be formatted as HH:MM")]
    BadReminderTime,
    #[error("name must not be empty")]
    EmptyName,
}

pub fn validate_mood(mood: u8) -> Result<(), ValidationIssue> {
    if (1..=5).contains(&mood) {
        Ok(())
    } else {
        Err(ValidationIssue::MoodOutOfRange)
    }
}

pub fn validate_habit(name: &str, reminder_time: Option<&str>) -> Result<(), ValidationIssue> {
    if name.trim().is_empty() {
        return Err(ValidationIssue::EmptyHabitName);
    }
    if let Some(rt) = reminder_time {
        NaiveTime::parse_from_str(rt, "%H:%M").map_err(|_| ValidationIssue::BadReminderTime)?;
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ValidationIssue> {
    if name.trim().is_empty() {
        Err(ValidationIssue::EmptyName)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_domain_is_closed() {
        assert!(validate_mood(0).is_err());
        for m in 1..=5 {
            assert!(validate_mood(m).is_ok());
        }
        assert!(validate_mood(6).is_err());
    }

    #[test]
    fn reminder_time_must_be_hh_mm() {
        assert!(validate_habit("meditate", Some("07:30")).is_ok());
        assert!(validate_habit("meditate", Some("7:30pm")).is_err());
        assert!(validate_habit("meditate", None).is_ok());
        assert!(validate_habit("   ", None).is_err());
    }
}
