pub mod auth;
pub mod children;
pub mod contacts;
pub mod error;
pub mod extract;
pub mod gifts;
pub mod invitations;
pub mod middleware;
pub mod notifications;
pub mod routes;
pub mod suggestions;
pub mod users;

use tracing::error;

use wunschbox_db::{Database, StoreResult};

use crate::auth::AppState;
use crate::error::ApiError;

/// Runs a blocking store call off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal("blocking task failed".into())
        })?
        .map_err(ApiError::from)
}
