use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use tend_core::analytics;
use tend_db::models::CheckInRow;
use tend_types::api::{CheckInRequest, CheckInResponse, Claims};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::{blocking, parse_uuid};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    30
}

/// Record a mood check-in. The store is append-only; the latest check-in
/// of a day is the authoritative value at read time.
pub async fn create_checkin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CheckInRequest>,
) -> ApiResult<impl IntoResponse> {
    tend_core::validate_mood(req.mood)?;

    let row = CheckInRow {
        id: Uuid::new_v4().to_string(),
        user_id: claims.sub.to_string(),
        mood: req.mood,
        notes: req.notes,
        timestamp: Utc::now(),
    };

    let response = blocking(move || {
        state.db.insert_checkin(&row)?;
        Ok(CheckInResponse {
            id: parse_uuid(&row.id),
            mood: row.mood,
            notes: row.notes,
            timestamp: row.timestamp,
        })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn checkin_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let days = query.days.clamp(1, 365);
    let user_id = claims.sub.to_string();

    let history = blocking(move || {
        let today = Utc::now().date_naive();
        let start = analytics::window_start(today, days).unwrap_or(today);
        let rows = state.db.checkins_since(&user_id, start)?;

        // Newest first for display.
        Ok(rows
            .into_iter()
            .rev()
            .map(|row| CheckInResponse {
                id: parse_uuid(&row.id),
                mood: row.mood,
                notes: row.notes,
                timestamp: row.timestamp,
            })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(history))
}
