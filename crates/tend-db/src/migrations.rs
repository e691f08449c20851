use rusqlite::Connection;
use tracing::info;

use crate::StoreResult;

pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS habits (
            id              TEXT PRIMARY KEY,
            user_id         TEXT NOT NULL REFERENCES users(id),
            name            TEXT NOT NULL,
            frequency       TEXT NOT NULL DEFAULT 'daily',
            reminder_time   TEXT,
            is_active       INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_habits_user
            ON habits(user_id, is_active);

        CREATE TABLE IF NOT EXISTS habit_logs (
            id              TEXT PRIMARY KEY,
            habit_id        TEXT NOT NULL REFERENCES habits(id),
            completed_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_habit_logs_habit
            ON habit_logs(habit_id, completed_at);

        CREATE TABLE IF NOT EXISTS commitments (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL REFERENCES users(id),
            task_description    TEXT NOT NULL,
            deadline            TEXT,
            status              TEXT NOT NULL DEFAULT 'pending',
            is_recurring        INTEGER NOT NULL DEFAULT 0,
            recurrence_pattern  TEXT,
            original_message    TEXT,
            created_at          TEXT NOT NULL,
            completed_at        TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_commitments_user
            ON commitments(user_id, status);

        CREATE TABLE IF NOT EXISTS daily_checkins (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            mood        INTEGER NOT NULL,
            notes       TEXT,
            timestamp   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_checkins_user
            ON daily_checkins(user_id, timestamp);

        CREATE TABLE IF NOT EXISTS conversations (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            message     TEXT NOT NULL,
            response    TEXT NOT NULL,
            timestamp   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_user
            ON conversations(user_id, timestamp);

        CREATE TABLE IF NOT EXISTS profiles (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL UNIQUE REFERENCES users(id),
            name        TEXT NOT NULL,
            pronouns    TEXT,
            description TEXT,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS people (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            name        TEXT NOT NULL,
            pronouns    TEXT,
            description TEXT,
            how_known   TEXT,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_people_user
            ON people(user_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
