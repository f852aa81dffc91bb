use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;

use wunschbox_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::with_db;

/// Notifications addressed to the caller's role, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let role = claims.role;
    let notifications = with_db(&state, move |db| db.list_notifications(role)).await?;
    Ok(Json(notifications))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let role = claims.role;
    let updated = with_db(&state, move |db| db.mark_notifications_read(role)).await?;
    Ok(Json(json!({ "updated": updated })))
}
