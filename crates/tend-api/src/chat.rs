use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use tend_assistant::protocol::ChatContext;
use tend_core::commitment::{self, CommitmentFields};
use tend_db::models::{CommitmentRow, ConversationRow};
use tend_types::api::{ChatAction, ChatRequest, ChatResponse, Claims, ConversationResponse};
use tend_types::domain::CommitmentStatus;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::{blocking, parse_uuid};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    50
}

/// One chat turn: forward the message with minimal context, execute any
/// structured side effects the assistant proposed, persist the exchange.
/// A provider failure surfaces before anything is stored, so a retried
/// request cannot duplicate a conversation row.
pub async fn chat(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.message.trim().is_empty() {
        return Err(ApiError::Validation("message must not be empty".into()));
    }

    // Gather context off the async runtime.
    let ctx_state = state.clone();
    let user_id = claims.sub.to_string();
    let (habits, pending_commitments) = blocking(move || {
        let habits = ctx_state
            .db
            .list_habits(&user_id)?
            .into_iter()
            .map(|h| format!("{} ({})", h.name, h.frequency.as_str()))
            .collect::<Vec<_>>();
        let pending = ctx_state
            .db
            .list_commitments(&user_id)?
            .into_iter()
            .filter(|c| c.status == CommitmentStatus::Pending)
            .map(|c| c.task_description)
            .collect::<Vec<_>>();
        Ok((habits, pending))
    })
    .await?;

    let context = ChatContext {
        username: claims.username.clone(),
        today: Utc::now().date_naive(),
        habits,
        pending_commitments,
    };

    let structured = state.assistant.reply(&context, &req.message).await?;
    let reply_text = structured.reply;
    let proposed = structured.commitments;

    // Execute side effects and persist the turn.
    let user_id = claims.sub.to_string();
    let message = req.message.clone();
    let stored_reply = reply_text.clone();
    let now = Utc::now();
    let actions = blocking(move || {
        let mut actions = Vec::new();
        for candidate in proposed {
            let fields = CommitmentFields {
                task_description: candidate.task_description.trim().to_string(),
                deadline: candidate.deadline,
                is_recurring: candidate.is_recurring,
                recurrence_pattern: candidate.recurrence_pattern,
            };
            if let Err(issue) = commitment::validate_new(&fields) {
                warn!("dropping assistant-proposed commitment: {}", issue);
                continue;
            }

            let id = Uuid::new_v4();
            state.db.create_commitment(&CommitmentRow {
                id: id.to_string(),
                user_id: user_id.clone(),
                task_description: fields.task_description.clone(),
                deadline: fields.deadline,
                status: CommitmentStatus::Pending,
                is_recurring: fields.is_recurring,
                recurrence_pattern: fields.recurrence_pattern,
                original_message: Some(message.clone()),
                created_at: now,
                completed_at: None,
            })?;
            actions.push(ChatAction::CommitmentCreated {
                id,
                task_description: fields.task_description,
                deadline: fields.deadline,
            });
        }

        state.db.insert_conversation(&ConversationRow {
            id: Uuid::new_v4().to_string(),
            user_id,
            message,
            response: stored_reply,
            timestamp: now,
        })?;

        Ok(actions)
    })
    .await?;

    Ok(Json(ChatResponse {
        message: req.message,
        response: reply_text,
        timestamp: now,
        actions,
    }))
}

pub async fn chat_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let limit = query.limit.min(200);
    let user_id = claims.sub.to_string();

    let history = blocking(move || {
        Ok(state
            .db
            .recent_conversations(&user_id, limit)?
            .into_iter()
            .map(|row| ConversationResponse {
                id: parse_uuid(&row.id),
                message: row.message,
                response: row.response,
                timestamp: row.timestamp,
            })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(history))
}
