pub mod analytics;
pub mod auth;
pub mod chat;
pub mod checkins;
pub mod commitments;
pub mod error;
pub mod habits;
pub mod middleware;
pub mod people;
pub mod profile;

use tracing::warn;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Row ids are written as UUID strings by this crate; a parse failure
/// means a corrupt row, worth a warning but not a failed request.
pub(crate) fn parse_uuid(raw: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt row id '{}': {}", raw, e);
        Uuid::default()
    })
}

/// Run blocking store work off the async runtime. Every rusqlite call made
/// from a handler goes through here.
pub(crate) async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })?
}
