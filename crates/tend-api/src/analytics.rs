//! On-demand aggregation endpoints. Summaries are computed synchronously
//! inside the request from raw rows — no caching, no incremental state. A
//! store failure surfaces as `data_unavailable`, never as a zeroed summary.

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use tend_core::{analytics, commitment};
use tend_types::api::{
    Claims, CommitmentAnalyticsResponse, HabitAnalyticsResponse, MoodAnalyticsResponse,
    OverviewResponse,
};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::{blocking, parse_uuid};

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    30
}

pub async fn overview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let summary = blocking(move || {
        let today = Utc::now().date_naive();
        let tomorrow = today.succ_opt().unwrap_or(today);

        let mut longest_streak = 0;
        for habit in state.db.list_habits(&user_id)? {
            let dates = log_dates(&state.db, &habit.id)?;
            let completed = analytics::completed_periods(&dates, habit.frequency);
            let streak = analytics::current_streak(&completed, today, habit.frequency);
            longest_streak = longest_streak.max(streak);
        }

        let checkins = checkin_pairs(&state.db, &user_id, today)?;

        Ok(OverviewResponse {
            habits_completed_today: state
                .db
                .count_habits_completed_between(&user_id, today, tomorrow)?,
            commitments_completed_today: state
                .db
                .count_commitments_completed_between(&user_id, today, tomorrow)?,
            longest_streak,
            current_mood: analytics::current_mood(&checkins, today),
            total_conversations: state.db.conversation_count(&user_id)?,
        })
    })
    .await?;

    Ok(Json(summary))
}

pub async fn habit_analytics(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let days = query.days.clamp(1, 365);
    let user_id = claims.sub.to_string();

    let response = blocking(move || {
        let today = Utc::now().date_naive();
        let mut habits = Vec::new();
        for habit in state.db.list_habits(&user_id)? {
            let dates = log_dates(&state.db, &habit.id)?;
            let facts = analytics::HabitFacts {
                id: parse_uuid(&habit.id),
                name: &habit.name,
                frequency: habit.frequency,
                created: habit.created_at.date_naive(),
                log_dates: &dates,
            };
            habits.push(analytics::habit_analytics(&facts, days, today));
        }
        Ok(HabitAnalyticsResponse { days, habits })
    })
    .await?;

    Ok(Json(response))
}

pub async fn commitment_analytics(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let days = query.days.clamp(1, 365);
    let user_id = claims.sub.to_string();

    let response = blocking(move || {
        let today = Utc::now().date_naive();
        let start = analytics::window_start(today, days).unwrap_or(today);
        let rows = state.db.list_commitments(&user_id)?;

        let total_created = rows
            .iter()
            .filter(|r| r.created_at.date_naive() >= start)
            .count() as u32;
        let total_completed = rows
            .iter()
            .filter(|r| r.completed_at.is_some_and(|t| t.date_naive() >= start))
            .count() as u32;
        let currently_overdue = rows
            .iter()
            .filter(|r| commitment::is_overdue(r.status, r.deadline, today))
            .count() as u32;

        Ok(CommitmentAnalyticsResponse {
            days,
            total_created,
            total_completed,
            currently_overdue,
            completion_rate: analytics::completion_rate(total_completed, total_created),
        })
    })
    .await?;

    Ok(Json(response))
}

pub async fn mood_analytics(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let days = query.days.clamp(1, 365);
    let user_id = claims.sub.to_string();

    let response = blocking(move || {
        let today = Utc::now().date_naive();
        let start = analytics::window_start(today, days).unwrap_or(today);
        let checkins = checkin_pairs(&state.db, &user_id, start)?;
        let trend = analytics::mood_trend(&checkins);

        Ok(MoodAnalyticsResponse {
            days,
            average_mood: analytics::average_mood(&trend),
            trend,
        })
    })
    .await?;

    Ok(Json(response))
}

fn log_dates(db: &tend_db::Database, habit_id: &str) -> ApiResult<Vec<NaiveDate>> {
    let times = db.habit_log_times(habit_id)?;
    Ok(times.iter().map(|t| t.date_naive()).collect())
}

fn checkin_pairs(
    db: &tend_db::Database,
    user_id: &str,
    start: NaiveDate,
) -> ApiResult<Vec<(DateTime<Utc>, u8)>> {
    let rows = db.checkins_since(user_id, start)?;
    Ok(rows.into_iter().map(|c| (c.timestamp, c.mood)).collect())
}
