use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use wunschbox_types::api::{Claims, CreateInvitationRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::middleware::require_parent;
use crate::with_db;

pub async fn create_invitation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateInvitationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_parent(&claims)?;
    let issuer = claims.sub;
    let invitation = with_db(&state, move |db| db.create_invitation(issuer, &req)).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

pub async fn list_invitations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_parent(&claims)?;
    let issuer = claims.sub;
    let invitations = with_db(&state, move |db| db.list_invitations_by(issuer)).await?;
    Ok(Json(invitations))
}

/// GET /api/invitations/{token}, public so the guest can see who invited
/// them before registering.
pub async fn lookup_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let invitation = with_db(&state, move |db| db.lookup_invitation(&token))
        .await
        .map_err(|e| match e {
            ApiError::NotFound(_) => {
                ApiError::NotFound("Invitation not found or already used".into())
            }
            other => other,
        })?;
    Ok(Json(invitation))
}
