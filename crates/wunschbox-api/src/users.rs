use axum::{Extension, Json, extract::State, response::IntoResponse};

use wunschbox_db::users::UserPatch;
use wunschbox_types::api::{Claims, MessageResponse, UpdateProfileRequest};

use crate::auth::{AppState, hash_password, validate_password};
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::with_db;

pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let id = claims.sub;
    let user = with_db(&state, move |db| db.get_user(id)).await?;
    Ok(Json(user))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password_hash = match &req.password {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let patch = UserPatch {
        name: req.name,
        role_description: req.role_description,
        email_notifications_enabled: req.email_notifications_enabled,
        password_hash,
    };

    let id = claims.sub;
    let user = with_db(&state, move |db| db.update_user(id, &patch)).await?;
    Ok(Json(user))
}

/// Deletes the caller's account and releases its reservations.
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let id = claims.sub;
    with_db(&state, move |db| db.delete_user(id)).await?;
    Ok(Json(MessageResponse::new("Account deleted")))
}
