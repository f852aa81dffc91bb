use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use wunschbox_db::reservation::reservation_message;
use wunschbox_types::api::{
    Claims, CreateGiftRequest, MessageResponse, ProxyMarkRequest, UpdateGiftRequest,
};
use wunschbox_types::listing::GiftFilter;
use wunschbox_types::models::{Gift, Role};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::middleware::require_parent;
use crate::with_db;

/// GET /api/gifts?child=&category= in display order.
pub async fn list_gifts(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<GiftFilter>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let gifts = with_db(&state, move |db| db.list_gifts(&filter)).await?;
    Ok(Json(gifts))
}

pub async fn get_gift(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let gift = with_db(&state, move |db| db.get_gift(gift_id)).await?;
    Ok(Json(gift))
}

pub async fn create_gift(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<CreateGiftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_parent(&claims)?;
    let gift = with_db(&state, move |db| db.create_gift(&req)).await?;
    Ok((StatusCode::CREATED, Json(gift)))
}

pub async fn update_gift(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<UpdateGiftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_parent(&claims)?;
    let gift = with_db(&state, move |db| db.update_gift(gift_id, &req)).await?;
    Ok(Json(gift))
}

pub async fn delete_gift(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_parent(&claims)?;
    with_db(&state, move |db| db.delete_gift(gift_id)).await?;
    Ok(Json(MessageResponse::new("Gift deleted")))
}

/// PUT /api/gifts/{id}/reserve. The reserver's name is read from the store
/// so a renamed account shows its current name.
pub async fn reserve_gift(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub;
    let gift = with_db(&state, move |db| {
        let user = db.get_user(user_id)?;
        db.reserve_gift(gift_id, user.id, &user.name)
    })
    .await?;

    notify_parents_by_email(&state, &gift).await;

    Ok(Json(gift))
}

pub async fn release_gift(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let (actor, role) = (claims.sub, claims.role);
    let gift = with_db(&state, move |db| db.release_gift(gift_id, actor, role)).await?;
    Ok(Json(gift))
}

/// PUT /api/gifts/{id}/proxy: a parent records a gift from someone without
/// an account.
pub async fn mark_by_proxy(
    State(state): State<AppState>,
    Path(gift_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<ProxyMarkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_parent(&claims)?;
    let parent = claims.sub;
    let gift = with_db(&state, move |db| {
        db.mark_gift_by_proxy(gift_id, &req.proxy_name, parent)
    })
    .await?;
    Ok(Json(gift))
}

/// Email delivery is not wired up; opted-in parents are logged as recipients.
/// A failure here never undoes the reservation.
async fn notify_parents_by_email(state: &AppState, gift: &Gift) {
    let recipients = match with_db(state, |db| db.list_email_recipients(Role::Parent)).await {
        Ok(r) => r,
        Err(e) => {
            warn!("Could not load email recipients: {}", e);
            return;
        }
    };

    let body = email_body(gift);
    for parent in recipients {
        info!("Email to {}: {}", parent.email, body);
    }
}

/// Same text as the in-app notification.
fn email_body(gift: &Gift) -> String {
    let reserver = gift.gifted_by_user_name.as_deref().unwrap_or_default();
    reservation_message(reserver, gift)
}
