use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use tend_core::{analytics, period};
use tend_db::Database;
use tend_db::models::HabitRow;
use tend_types::api::{
    Claims, HabitLogResponse, HabitRequest, HabitResponse, HabitStatsResponse,
};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::{blocking, parse_uuid};

pub async fn list_habits(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let habits = blocking(move || {
        let today = Utc::now().date_naive();
        let rows = state.db.list_habits(&user_id)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(habit_response(&state.db, row, today)?);
        }
        Ok(out)
    })
    .await?;

    Ok(Json(habits))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<HabitRequest>,
) -> ApiResult<impl IntoResponse> {
    tend_core::validate_habit(&req.name, req.reminder_time.as_deref())?;

    let row = HabitRow {
        id: Uuid::new_v4().to_string(),
        user_id: claims.sub.to_string(),
        name: req.name.trim().to_string(),
        frequency: req.frequency,
        reminder_time: req.reminder_time,
        is_active: true,
        created_at: Utc::now(),
    };

    let habit = blocking(move || {
        state.db.create_habit(&row)?;
        habit_response(&state.db, row, Utc::now().date_naive())
    })
    .await?;

    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<HabitRequest>,
) -> ApiResult<impl IntoResponse> {
    tend_core::validate_habit(&req.name, req.reminder_time.as_deref())?;

    let user_id = claims.sub.to_string();
    let habit = blocking(move || {
        let hid = habit_id.to_string();
        let changed = state.db.update_habit(
            &user_id,
            &hid,
            req.name.trim(),
            req.frequency,
            req.reminder_time.as_deref(),
        )?;
        if !changed {
            return Err(ApiError::NotFound("habit"));
        }
        let row = state
            .db
            .get_habit(&user_id, &hid)?
            .ok_or(ApiError::NotFound("habit"))?;
        habit_response(&state.db, row, Utc::now().date_naive())
    })
    .await?;

    Ok(Json(habit))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    blocking(move || {
        if !state.db.deactivate_habit(&user_id, &habit_id.to_string())? {
            return Err(ApiError::NotFound("habit"));
        }
        Ok(())
    })
    .await?;

    Ok(Json(serde_json::json!({ "message": "habit deleted" })))
}

/// Append a completion log for the current eligible period. Logging twice
/// in one period is idempotent: the existing log comes back and nothing is
/// written, so two racing tabs still produce one countable completion.
pub async fn log_habit(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let (log, created) = blocking(move || {
        let habit = state
            .db
            .get_habit(&user_id, &habit_id.to_string())?
            .ok_or(ApiError::NotFound("habit"))?;

        let now = Utc::now();
        let (start, end) = period::period_bounds(now.date_naive(), habit.frequency);

        if let Some(existing) = state.db.habit_log_in_range(&habit.id, start, end)? {
            return Ok((
                HabitLogResponse {
                    id: parse_uuid(&existing.id),
                    habit_id,
                    completed_at: existing.completed_at,
                    already_logged: true,
                },
                false,
            ));
        }

        let log_id = Uuid::new_v4();
        state
            .db
            .insert_habit_log(&log_id.to_string(), &habit.id, now)?;
        Ok((
            HabitLogResponse {
                id: log_id,
                habit_id,
                completed_at: now,
                already_logged: false,
            },
            true,
        ))
    })
    .await?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(log)))
}

pub async fn habit_stats(
    State(state): State<AppState>,
    Path(habit_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let stats = blocking(move || {
        let habit = state
            .db
            .get_habit(&user_id, &habit_id.to_string())?
            .ok_or(ApiError::NotFound("habit"))?;

        let today = Utc::now().date_naive();
        let dates = log_dates(&state.db, &habit.id)?;
        let completed = analytics::completed_periods(&dates, habit.frequency);

        Ok(HabitStatsResponse {
            habit_id,
            total_completions: completed.len() as u32,
            current_streak: analytics::current_streak(&completed, today, habit.frequency),
            completed_today: completed.contains(&period::period_index(today, habit.frequency)),
        })
    })
    .await?;

    Ok(Json(stats))
}

fn habit_response(db: &Database, row: HabitRow, today: NaiveDate) -> ApiResult<HabitResponse> {
    let dates = log_dates(db, &row.id)?;
    let completed = analytics::completed_periods(&dates, row.frequency);

    Ok(HabitResponse {
        id: parse_uuid(&row.id),
        name: row.name,
        frequency: row.frequency,
        reminder_time: row.reminder_time,
        is_active: row.is_active,
        created_at: row.created_at,
        completed_today: completed.contains(&period::period_index(today, row.frequency)),
        current_streak: analytics::current_streak(&completed, today, row.frequency),
    })
}

fn log_dates(db: &Database, habit_id: &str) -> ApiResult<Vec<NaiveDate>> {
    let times = db.habit_log_times(habit_id)?;
    Ok(times.iter().map(|t| t.date_naive()).collect())
}
