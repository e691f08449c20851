use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use tend_db::models::PersonRow;
use tend_types::api::{Claims, PersonRequest, PersonResponse};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::{blocking, parse_uuid};

pub async fn list_people(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let people = blocking(move || {
        Ok(state
            .db
            .list_people(&user_id)?
            .into_iter()
            .map(person_response)
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(people))
}

pub async fn create_person(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PersonRequest>,
) -> ApiResult<impl IntoResponse> {
    tend_core::validate_name(&req.name)?;

    let now = Utc::now();
    let row = PersonRow {
        id: Uuid::new_v4().to_string(),
        user_id: claims.sub.to_string(),
        name: req.name.trim().to_string(),
        pronouns: req.pronouns,
        description: req.description,
        how_known: req.how_known,
        created_at: now,
        updated_at: now,
    };

    let response = blocking(move || {
        state.db.insert_person(&row)?;
        Ok(person_response(row))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let person = blocking(move || Ok(state.db.get_person(&user_id, &id.to_string())?))
        .await?
        .ok_or(ApiError::NotFound("person"))?;

    Ok(Json(person_response(person)))
}

pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PersonRequest>,
) -> ApiResult<impl IntoResponse> {
    tend_core::validate_name(&req.name)?;

    let user_id = claims.sub.to_string();
    let response = blocking(move || {
        let pid = id.to_string();
        let changed = state.db.update_person(
            &user_id,
            &pid,
            req.name.trim(),
            req.pronouns.as_deref(),
            req.description.as_deref(),
            req.how_known.as_deref(),
            Utc::now(),
        )?;
        if !changed {
            return Err(ApiError::NotFound("person"));
        }
        let row = state
            .db
            .get_person(&user_id, &pid)?
            .ok_or(ApiError::NotFound("person"))?;
        Ok(person_response(row))
    })
    .await?;

    Ok(Json(response))
}

pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    blocking(move || {
        if !state.db.delete_person(&user_id, &id.to_string())? {
            return Err(ApiError::NotFound("person"));
        }
        Ok(())
    })
    .await?;

    Ok(Json(serde_json::json!({ "message": "person deleted" })))
}

fn person_response(row: PersonRow) -> PersonResponse {
    PersonResponse {
        id: parse_uuid(&row.id),
        name: row.name,
        pronouns: row.pronouns,
        description: row.description,
        how_known: row.how_known,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
