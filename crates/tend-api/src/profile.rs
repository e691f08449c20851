use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use uuid::Uuid;

use tend_db::models::ProfileRow;
use tend_types::api::{Claims, ProfileRequest, ProfileResponse};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::{blocking, parse_uuid};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let profile = blocking(move || Ok(state.db.get_profile(&user_id)?))
        .await?
        .ok_or(ApiError::NotFound("profile"))?;

    Ok(Json(profile_response(profile)))
}

pub async fn create_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    tend_core::validate_name(&req.name)?;

    let now = Utc::now();
    let row = ProfileRow {
        id: Uuid::new_v4().to_string(),
        user_id: claims.sub.to_string(),
        name: req.name.trim().to_string(),
        pronouns: req.pronouns,
        description: req.description,
        created_at: now,
        updated_at: now,
    };

    let response = blocking(move || {
        state.db.insert_profile(&row)?;
        Ok(profile_response(row))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    tend_core::validate_name(&req.name)?;

    let user_id = claims.sub.to_string();
    let response = blocking(move || {
        let changed = state.db.update_profile(
            &user_id,
            req.name.trim(),
            req.pronouns.as_deref(),
            req.description.as_deref(),
            Utc::now(),
        )?;
        if !changed {
            return Err(ApiError::NotFound("profile"));
        }
        let row = state
            .db
            .get_profile(&user_id)?
            .ok_or(ApiError::NotFound("profile"))?;
        Ok(profile_response(row))
    })
    .await?;

    Ok(Json(response))
}

fn profile_response(row: ProfileRow) -> ProfileResponse {
    ProfileResponse {
        id: parse_uuid(&row.id),
        name: row.name,
        pronouns: row.pronouns,
        description: row.description,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
