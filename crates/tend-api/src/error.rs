use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use tend_assistant::AssistantError;
use tend_core::ValidationIssue;
use tend_db::StoreError;

/// Request-scoped failure taxonomy. Every variant maps to a stable `kind`
/// so clients can branch without parsing messages. Store and provider
/// failures keep their own kinds — a failed fetch is never presented as an
/// empty result.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid or missing credentials")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} already registered")]
    Conflict(String),
    #[error("the data store is unavailable")]
    DataUnavailable,
    #[error("assistant provider failure: {0}")]
    UpstreamProvider(String),
    #[error("internal error")]
    Internal,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Unauthorized => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::DataUnavailable => "data_unavailable",
            Self::UpstreamProvider(_) => "upstream_provider",
            Self::Internal => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DataUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamProvider(_) => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {}", self);
        }
        let body = Json(json!({
            "error": { "kind": self.kind(), "message": self.to_string() }
        }));
        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Self::NotFound("record"),
            StoreError::Conflict(what) => Self::Conflict(what.to_string()),
            StoreError::Sqlite(err) => {
                error!("store failure: {}", err);
                Self::DataUnavailable
            }
            StoreError::LockPoisoned => Self::DataUnavailable,
        }
    }
}

impl From<ValidationIssue> for ApiError {
    fn from(issue: ValidationIssue) -> Self {
        Self::Validation(issue.to_string())
    }
}

impl From<AssistantError> for ApiError {
    fn from(e: AssistantError) -> Self {
        Self::UpstreamProvider(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(ApiError::Validation("x".into()).kind(), "validation");
        assert_eq!(ApiError::Unauthorized.kind(), "unauthorized");
        assert_eq!(ApiError::NotFound("habit").kind(), "not_found");
        assert_eq!(ApiError::Conflict("username".into()).kind(), "conflict");
        assert_eq!(ApiError::DataUnavailable.kind(), "data_unavailable");
        assert_eq!(ApiError::UpstreamProvider("x".into()).kind(), "upstream_provider");
    }

    #[test]
    fn store_failures_stay_distinguishable_from_empty_results() {
        let e: ApiError = StoreError::LockPoisoned.into();
        assert_eq!(e.kind(), "data_unavailable");

        let e: ApiError = StoreError::NotFound.into();
        assert_eq!(e.kind(), "not_found");
    }
}
