use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{OptionalExtension, Row, params};

use tend_types::domain::{CommitmentStatus, Frequency, RecurrencePattern};

use crate::models::{
    CheckInRow, CommitmentRow, ConversationRow, HabitLogRow, HabitRow, PersonRow, ProfileRow,
    UserRow,
};
use crate::{Database, StoreError, StoreResult};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, username, email, password_hash, created_at],
            )
            .map_err(|e| conflict_on_unique(e, "username or email"))?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, email, password, created_at
                     FROM users WHERE username = ?1",
                    [username],
                    map_user,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, email, password, created_at
                     FROM users WHERE id = ?1",
                    [id],
                    map_user,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Habits --

    pub fn create_habit(&self, habit: &HabitRow) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO habits (id, user_id, name, frequency, reminder_time, is_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    habit.id,
                    habit.user_id,
                    habit.name,
                    habit.frequency.as_str(),
                    habit.reminder_time,
                    habit.is_active,
                    habit.created_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Active habits only — soft-deleted rows stay out of every listing.
    pub fn list_habits(&self, user_id: &str) -> StoreResult<Vec<HabitRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, name, frequency, reminder_time, is_active, created_at
                 FROM habits WHERE user_id = ?1 AND is_active = 1
                 ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([user_id], map_habit)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_habit(&self, user_id: &str, habit_id: &str) -> StoreResult<Option<HabitRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, user_id, name, frequency, reminder_time, is_active, created_at
                     FROM habits WHERE id = ?1 AND user_id = ?2",
                    params![habit_id, user_id],
                    map_habit,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_habit(
        &self,
        user_id: &str,
        habit_id: &str,
        name: &str,
        frequency: Frequency,
        reminder_time: Option<&str>,
    ) -> StoreResult<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE habits SET name = ?1, frequency = ?2, reminder_time = ?3
                 WHERE id = ?4 AND user_id = ?5",
                params![name, frequency.as_str(), reminder_time, habit_id, user_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Soft delete: the habit and its history survive, hidden from listings.
    pub fn deactivate_habit(&self, user_id: &str, habit_id: &str) -> StoreResult<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE habits SET is_active = 0 WHERE id = ?1 AND user_id = ?2",
                params![habit_id, user_id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn insert_habit_log(
        &self,
        id: &str,
        habit_id: &str,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO habit_logs (id, habit_id, completed_at) VALUES (?1, ?2, ?3)",
                params![id, habit_id, completed_at],
            )?;
            Ok(())
        })
    }

    /// Earliest log inside `[start, end)` (calendar dates), if any.
    pub fn habit_log_in_range(
        &self,
        habit_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Option<HabitLogRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, habit_id, completed_at FROM habit_logs
                     WHERE habit_id = ?1
                       AND date(completed_at) >= ?2 AND date(completed_at) < ?3
                     ORDER BY completed_at LIMIT 1",
                    params![habit_id, start, end],
                    map_habit_log,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn habit_log_times(&self, habit_id: &str) -> StoreResult<Vec<DateTime<Utc>>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT completed_at FROM habit_logs WHERE habit_id = ?1 ORDER BY completed_at",
            )?;
            let rows = stmt
                .query_map([habit_id], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Distinct active habits with at least one log in `[start, end)`.
    pub fn count_habits_completed_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<u32> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(DISTINCT l.habit_id)
                 FROM habit_logs l
                 JOIN habits h ON h.id = l.habit_id
                 WHERE h.user_id = ?1 AND h.is_active = 1
                   AND date(l.completed_at) >= ?2 AND date(l.completed_at) < ?3",
                params![user_id, start, end],
                |row| row.get(0),
            )?;
            Ok(u32::try_from(count).unwrap_or(0))
        })
    }

    // -- Commitments --

    pub fn create_commitment(&self, commitment: &CommitmentRow) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO commitments
                 (id, user_id, task_description, deadline, status, is_recurring,
                  recurrence_pattern, original_message, created_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    commitment.id,
                    commitment.user_id,
                    commitment.task_description,
                    commitment.deadline,
                    commitment.status.as_str(),
                    commitment.is_recurring,
                    commitment.recurrence_pattern.map(RecurrencePattern::as_str),
                    commitment.original_message,
                    commitment.created_at,
                    commitment.completed_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_commitments(&self, user_id: &str) -> StoreResult<Vec<CommitmentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, task_description, deadline, status, is_recurring,
                        recurrence_pattern, original_message, created_at, completed_at
                 FROM commitments WHERE user_id = ?1
                 ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([user_id], map_commitment)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_commitment(&self, user_id: &str, id: &str) -> StoreResult<Option<CommitmentRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, user_id, task_description, deadline, status, is_recurring,
                            recurrence_pattern, original_message, created_at, completed_at
                     FROM commitments WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                    map_commitment,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_commitment(
        &self,
        user_id: &str,
        id: &str,
        task_description: &str,
        deadline: Option<NaiveDate>,
        is_recurring: bool,
        recurrence_pattern: Option<RecurrencePattern>,
    ) -> StoreResult<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE commitments
                 SET task_description = ?1, deadline = ?2, is_recurring = ?3,
                     recurrence_pattern = ?4
                 WHERE id = ?5 AND user_id = ?6",
                params![
                    task_description,
                    deadline,
                    is_recurring,
                    recurrence_pattern.map(RecurrencePattern::as_str),
                    id,
                    user_id,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Flips a pending commitment to completed. Returns false when nothing
    /// changed — already completed or not owned — which makes `complete`
    /// naturally idempotent at the call site.
    pub fn complete_commitment(
        &self,
        user_id: &str,
        id: &str,
        completed_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE commitments SET status = 'completed', completed_at = ?1
                 WHERE id = ?2 AND user_id = ?3 AND status = 'pending'",
                params![completed_at, id, user_id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_commitment(&self, user_id: &str, id: &str) -> StoreResult<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "DELETE FROM commitments WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn count_commitments_completed_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<u32> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM commitments
                 WHERE user_id = ?1 AND status = 'completed'
                   AND completed_at IS NOT NULL
                   AND date(completed_at) >= ?2 AND date(completed_at) < ?3",
                params![user_id, start, end],
                |row| row.get(0),
            )?;
            Ok(u32::try_from(count).unwrap_or(0))
        })
    }

    // -- Check-ins --

    pub fn insert_checkin(&self, checkin: &CheckInRow) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO daily_checkins (id, user_id, mood, notes, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    checkin.id,
                    checkin.user_id,
                    checkin.mood,
                    checkin.notes,
                    checkin.timestamp,
                ],
            )?;
            Ok(())
        })
    }

    /// Check-ins on or after `start` (calendar date), oldest first.
    pub fn checkins_since(&self, user_id: &str, start: NaiveDate) -> StoreResult<Vec<CheckInRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, mood, notes, timestamp FROM daily_checkins
                 WHERE user_id = ?1 AND date(timestamp) >= ?2
                 ORDER BY timestamp",
            )?;
            let rows = stmt
                .query_map(params![user_id, start], map_checkin)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Conversations --

    pub fn insert_conversation(&self, conversation: &ConversationRow) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, user_id, message, response, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    conversation.id,
                    conversation.user_id,
                    conversation.message,
                    conversation.response,
                    conversation.timestamp,
                ],
            )?;
            Ok(())
        })
    }

    pub fn recent_conversations(
        &self,
        user_id: &str,
        limit: u32,
    ) -> StoreResult<Vec<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, message, response, timestamp FROM conversations
                 WHERE user_id = ?1 ORDER BY timestamp DESC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![user_id, limit], map_conversation)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn conversation_count(&self, user_id: &str) -> StoreResult<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM conversations WHERE user_id = ?1",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(u64::try_from(count).unwrap_or(0))
        })
    }

    // -- Profile --

    pub fn get_profile(&self, user_id: &str) -> StoreResult<Option<ProfileRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, user_id, name, pronouns, description, created_at, updated_at
                     FROM profiles WHERE user_id = ?1",
                    [user_id],
                    map_profile,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn insert_profile(&self, profile: &ProfileRow) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO profiles (id, user_id, name, pronouns, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    profile.id,
                    profile.user_id,
                    profile.name,
                    profile.pronouns,
                    profile.description,
                    profile.created_at,
                    profile.updated_at,
                ],
            )
            .map_err(|e| conflict_on_unique(e, "profile"))?;
            Ok(())
        })
    }

    pub fn update_profile(
        &self,
        user_id: &str,
        name: &str,
        pronouns: Option<&str>,
        description: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE profiles SET name = ?1, pronouns = ?2, description = ?3, updated_at = ?4
                 WHERE user_id = ?5",
                params![name, pronouns, description, updated_at, user_id],
            )?;
            Ok(changed > 0)
        })
    }

    // -- People --

    pub fn insert_person(&self, person: &PersonRow) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO people
                 (id, user_id, name, pronouns, description, how_known, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    person.id,
                    person.user_id,
                    person.name,
                    person.pronouns,
                    person.description,
                    person.how_known,
                    person.created_at,
                    person.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_people(&self, user_id: &str) -> StoreResult<Vec<PersonRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, name, pronouns, description, how_known, created_at, updated_at
                 FROM people WHERE user_id = ?1 ORDER BY name",
            )?;
            let rows = stmt
                .query_map([user_id], map_person)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_person(&self, user_id: &str, id: &str) -> StoreResult<Option<PersonRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, user_id, name, pronouns, description, how_known, created_at, updated_at
                     FROM people WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                    map_person,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn update_person(
        &self,
        user_id: &str,
        id: &str,
        name: &str,
        pronouns: Option<&str>,
        description: Option<&str>,
        how_known: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE people
                 SET name = ?1, pronouns = ?2, description = ?3, how_known = ?4, updated_at = ?5
                 WHERE id = ?6 AND user_id = ?7",
                params![name, pronouns, description, how_known, updated_at, id, user_id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_person(&self, user_id: &str, id: &str) -> StoreResult<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "DELETE FROM people WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )?;
            Ok(changed > 0)
        })
    }
}

// -- Row mappers --

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn map_habit(row: &Row<'_>) -> rusqlite::Result<HabitRow> {
    Ok(HabitRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        frequency: parse_frequency(3, row.get(3)?)?,
        reminder_time: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_habit_log(row: &Row<'_>) -> rusqlite::Result<HabitLogRow> {
    Ok(HabitLogRow {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        completed_at: row.get(2)?,
    })
}

fn map_commitment(row: &Row<'_>) -> rusqlite::Result<CommitmentRow> {
    Ok(CommitmentRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        task_description: row.get(2)?,
        deadline: row.get(3)?,
        status: parse_status(4, row.get(4)?)?,
        is_recurring: row.get(5)?,
        recurrence_pattern: parse_pattern(6, row.get(6)?)?,
        original_message: row.get(7)?,
        created_at: row.get(8)?,
        completed_at: row.get(9)?,
    })
}

fn map_checkin(row: &Row<'_>) -> rusqlite::Result<CheckInRow> {
    Ok(CheckInRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        mood: row.get(2)?,
        notes: row.get(3)?,
        timestamp: row.get(4)?,
    })
}

fn map_conversation(row: &Row<'_>) -> rusqlite::Result<ConversationRow> {
    Ok(ConversationRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        message: row.get(2)?,
        response: row.get(3)?,
        timestamp: row.get(4)?,
    })
}

fn map_profile(row: &Row<'_>) -> rusqlite::Result<ProfileRow> {
    Ok(ProfileRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        pronouns: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn map_person(row: &Row<'_>) -> rusqlite::Result<PersonRow> {
    Ok(PersonRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        pronouns: row.get(3)?,
        description: row.get(4)?,
        how_known: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn parse_frequency(idx: usize, s: String) -> rusqlite::Result<Frequency> {
    Frequency::parse(&s).ok_or_else(|| invalid_text(idx, format!("unknown frequency '{s}'")))
}

fn parse_status(idx: usize, s: String) -> rusqlite::Result<CommitmentStatus> {
    CommitmentStatus::parse(&s)
        .ok_or_else(|| invalid_text(idx, format!("unknown commitment status '{s}'")))
}

fn parse_pattern(idx: usize, s: Option<String>) -> rusqlite::Result<Option<RecurrencePattern>> {
    match s {
        None => Ok(None),
        Some(s) => RecurrencePattern::parse(&s)
            .map(Some)
            .ok_or_else(|| invalid_text(idx, format!("unknown recurrence pattern '{s}'"))),
    }
}

fn invalid_text(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
}

fn conflict_on_unique(e: rusqlite::Error, what: &'static str) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict(what)
        }
        _ => StoreError::Sqlite(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn seed_user(db: &Database, username: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.create_user(&id, username, &format!("{username}@example.com"), "hash", Utc::now())
            .expect("create user");
        id
    }

    fn seed_habit(db: &Database, user_id: &str, name: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.create_habit(&HabitRow {
            id: id.clone(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            frequency: Frequency::Daily,
            reminder_time: None,
            is_active: true,
            created_at: Utc::now(),
        })
        .expect("create habit");
        id
    }

    #[test]
    fn duplicate_username_is_a_conflict() {
        let db = Database::open_in_memory().expect("open");
        seed_user(&db, "ada");
        let err = db
            .create_user(&Uuid::new_v4().to_string(), "ada", "other@example.com", "hash", Utc::now())
            .expect_err("duplicate must fail");
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn habits_are_invisible_across_users() {
        let db = Database::open_in_memory().expect("open");
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let habit_id = seed_habit(&db, &alice, "journal");

        assert!(db.get_habit(&alice, &habit_id).expect("query").is_some());
        assert!(db.get_habit(&bob, &habit_id).expect("query").is_none());
        assert!(!db.deactivate_habit(&bob, &habit_id).expect("query"));
    }

    #[test]
    fn soft_deleted_habits_leave_listings() {
        let db = Database::open_in_memory().expect("open");
        let alice = seed_user(&db, "alice");
        let habit_id = seed_habit(&db, &alice, "journal");

        assert_eq!(db.list_habits(&alice).expect("list").len(), 1);
        assert!(db.deactivate_habit(&alice, &habit_id).expect("deactivate"));
        assert!(db.list_habits(&alice).expect("list").is_empty());
        // The row itself survives for history.
        assert!(db.get_habit(&alice, &habit_id).expect("get").is_some());
    }

    #[test]
    fn habit_log_range_scan_finds_todays_log() {
        let db = Database::open_in_memory().expect("open");
        let alice = seed_user(&db, "alice");
        let habit_id = seed_habit(&db, &alice, "journal");

        let now = Utc::now();
        let today = now.date_naive();
        let tomorrow = today.succ_opt().expect("date range");

        assert!(
            db.habit_log_in_range(&habit_id, today, tomorrow)
                .expect("scan")
                .is_none()
        );
        db.insert_habit_log(&Uuid::new_v4().to_string(), &habit_id, now)
            .expect("log");
        assert!(
            db.habit_log_in_range(&habit_id, today, tomorrow)
                .expect("scan")
                .is_some()
        );
        assert_eq!(
            db.count_habits_completed_between(&alice, today, tomorrow)
                .expect("count"),
            1
        );
    }

    #[test]
    fn complete_commitment_only_flips_pending_rows() {
        let db = Database::open_in_memory().expect("open");
        let alice = seed_user(&db, "alice");
        let id = Uuid::new_v4().to_string();
        db.create_commitment(&CommitmentRow {
            id: id.clone(),
            user_id: alice.clone(),
            task_description: "file taxes".to_string(),
            deadline: None,
            status: CommitmentStatus::Pending,
            is_recurring: false,
            recurrence_pattern: None,
            original_message: None,
            created_at: Utc::now(),
            completed_at: None,
        })
        .expect("create");

        assert!(db.complete_commitment(&alice, &id, Utc::now()).expect("complete"));
        // Second call is a no-op, not an error.
        assert!(!db.complete_commitment(&alice, &id, Utc::now()).expect("complete"));

        let row = db.get_commitment(&alice, &id).expect("get").expect("exists");
        assert_eq!(row.status, CommitmentStatus::Completed);
        assert!(row.completed_at.is_some());
    }

    #[test]
    fn commitments_are_invisible_across_users() {
        let db = Database::open_in_memory().expect("open");
        let alice = seed_user(&db, "alice");
        let bob = seed_user(&db, "bob");
        let id = Uuid::new_v4().to_string();
        db.create_commitment(&CommitmentRow {
            id: id.clone(),
            user_id: alice,
            task_description: "water plants".to_string(),
            deadline: None,
            status: CommitmentStatus::Pending,
            is_recurring: false,
            recurrence_pattern: None,
            original_message: None,
            created_at: Utc::now(),
            completed_at: None,
        })
        .expect("create");

        assert!(db.get_commitment(&bob, &id).expect("get").is_none());
        assert!(!db.delete_commitment(&bob, &id).expect("delete"));
    }

    #[test]
    fn one_profile_per_user() {
        let db = Database::open_in_memory().expect("open");
        let alice = seed_user(&db, "alice");
        let make = |id: String| ProfileRow {
            id,
            user_id: alice.clone(),
            name: "Alice".to_string(),
            pronouns: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        db.insert_profile(&make(Uuid::new_v4().to_string())).expect("insert");
        let err = db
            .insert_profile(&make(Uuid::new_v4().to_string()))
            .expect_err("second profile must fail");
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
