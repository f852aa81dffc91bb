use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use wunschbox_types::api::{Claims, CreateChildRequest, MessageResponse, UpdateChildRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::middleware::require_parent;
use crate::with_db;

pub async fn list_children(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let children = with_db(&state, |db| db.list_children()).await?;
    Ok(Json(children))
}

/// GET /api/children/names: registered children plus names only found on gifts.
pub async fn list_child_names(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let names = with_db(&state, |db| db.known_child_names()).await?;
    Ok(Json(names))
}

pub async fn create_child(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateChildRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_parent(&claims)?;
    let creator = claims.sub;
    let child = with_db(&state, move |db| db.create_child(creator, &req)).await?;
    Ok((StatusCode::CREATED, Json(child)))
}

pub async fn update_child(
    State(state): State<AppState>,
    Path(child_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<UpdateChildRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_parent(&claims)?;
    let child = with_db(&state, move |db| db.update_child(child_id, &req)).await?;
    Ok(Json(child))
}

pub async fn delete_child(
    State(state): State<AppState>,
    Path(child_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_parent(&claims)?;
    with_db(&state, move |db| db.delete_child(child_id)).await?;
    Ok(Json(MessageResponse::new("Child deleted")))
}
