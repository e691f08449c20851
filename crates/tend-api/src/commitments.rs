use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use tend_core::commitment::{self, CommitmentFields, OrderFacts};
use tend_db::models::CommitmentRow;
use tend_types::api::{
    Claims, CommitmentCreateRequest, CommitmentResponse, CommitmentUpdateRequest,
};
use tend_types::domain::{CommitmentSortKey, CommitmentStatus, SortOrder};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::{blocking, parse_uuid};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub sort: CommitmentSortKey,
    #[serde(default)]
    pub order: SortOrder,
    pub status: Option<CommitmentStatus>,
}

pub async fn list_commitments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let commitments = blocking(move || {
        let today = Utc::now().date_naive();
        let mut rows = state.db.list_commitments(&user_id)?;

        if let Some(status) = query.status {
            rows.retain(|r| r.status == status);
        }

        rows.sort_by(|a, b| {
            commitment::display_cmp(&facts(a), &facts(b), today, query.sort, query.order)
        });

        Ok(rows
            .into_iter()
            .map(|row| commitment_response(row, today))
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(commitments))
}

pub async fn create_commitment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CommitmentCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let fields = CommitmentFields {
        task_description: req.task_description.trim().to_string(),
        deadline: req.deadline,
        is_recurring: req.is_recurring,
        recurrence_pattern: req.recurrence_pattern,
    };
    commitment::validate_new(&fields)?;

    let row = CommitmentRow {
        id: Uuid::new_v4().to_string(),
        user_id: claims.sub.to_string(),
        task_description: fields.task_description,
        deadline: fields.deadline,
        status: CommitmentStatus::Pending,
        is_recurring: fields.is_recurring,
        recurrence_pattern: fields.recurrence_pattern,
        original_message: req.original_message,
        created_at: Utc::now(),
        completed_at: None,
    };

    let response = blocking(move || {
        state.db.create_commitment(&row)?;
        Ok(commitment_response(row, Utc::now().date_naive()))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_commitment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(patch): Json<CommitmentUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let response = blocking(move || {
        let cid = id.to_string();
        let row = state
            .db
            .get_commitment(&user_id, &cid)?
            .ok_or(ApiError::NotFound("commitment"))?;

        let next = commitment::apply_patch(
            CommitmentFields {
                task_description: row.task_description,
                deadline: row.deadline,
                is_recurring: row.is_recurring,
                recurrence_pattern: row.recurrence_pattern,
            },
            &patch,
        )?;

        state.db.update_commitment(
            &user_id,
            &cid,
            &next.task_description,
            next.deadline,
            next.is_recurring,
            next.recurrence_pattern,
        )?;

        let row = state
            .db
            .get_commitment(&user_id, &cid)?
            .ok_or(ApiError::NotFound("commitment"))?;
        Ok(commitment_response(row, Utc::now().date_naive()))
    })
    .await?;

    Ok(Json(response))
}

/// Idempotent: completing an already-completed commitment is a no-op that
/// returns the unchanged row.
pub async fn complete_commitment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    let response = blocking(move || {
        let cid = id.to_string();
        let row = state
            .db
            .get_commitment(&user_id, &cid)?
            .ok_or(ApiError::NotFound("commitment"))?;

        if row.status == CommitmentStatus::Pending {
            state.db.complete_commitment(&user_id, &cid, Utc::now())?;
        }

        let row = state
            .db
            .get_commitment(&user_id, &cid)?
            .ok_or(ApiError::NotFound("commitment"))?;
        Ok(commitment_response(row, Utc::now().date_naive()))
    })
    .await?;

    Ok(Json(response))
}

pub async fn delete_commitment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user_id = claims.sub.to_string();
    blocking(move || {
        if !state.db.delete_commitment(&user_id, &id.to_string())? {
            return Err(ApiError::NotFound("commitment"));
        }
        Ok(())
    })
    .await?;

    Ok(Json(serde_json::json!({ "message": "commitment deleted" })))
}

fn facts(row: &CommitmentRow) -> OrderFacts {
    OrderFacts {
        status: row.status,
        deadline: row.deadline,
        created_at: row.created_at,
    }
}

fn commitment_response(row: CommitmentRow, today: NaiveDate) -> CommitmentResponse {
    let overdue = commitment::is_overdue(row.status, row.deadline, today);
    let due_today = commitment::is_due_today(row.status, row.deadline, today);

    CommitmentResponse {
        id: parse_uuid(&row.id),
        task_description: row.task_description,
        deadline: row.deadline,
        status: row.status,
        overdue,
        due_today,
        is_recurring: row.is_recurring,
        recurrence_pattern: row.recurrence_pattern,
        original_message: row.original_message,
        created_at: row.created_at,
        completed_at: row.completed_at,
    }
}
