use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use wunschbox_types::api::{Claims, CreateContactRequest, MessageResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::with_db;

pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = claims.sub;
    let contacts = with_db(&state, move |db| db.list_contacts(owner)).await?;
    Ok(Json(contacts))
}

pub async fn create_contact(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = claims.sub;
    let contact = with_db(&state, move |db| db.create_contact(owner, &req)).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = claims.sub;
    with_db(&state, move |db| db.delete_contact(contact_id, owner)).await?;
    Ok(Json(MessageResponse::new("Contact deleted")))
}
