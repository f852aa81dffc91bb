use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::warn;

use wunschbox_db::Database;
use wunschbox_db::users::NewUser;
use wunschbox_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use wunschbox_types::models::User;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::suggestions::GiftSuggester;
use crate::with_db;

const MIN_PASSWORD_LEN: usize = 8;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub suggester: Arc<dyn GiftSuggester>,
}

/// POST /api/auth/register. With an invitation token the account gets the
/// invited role; without one it is a parent.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() || req.name.len() > 64 {
        return Err(ApiError::Validation("name must be 1-64 characters".into()));
    }
    validate_password(&req.password)?;

    let new_user = NewUser {
        name: req.name,
        email: req.email,
        password_hash: hash_password(&req.password)?,
        email_notifications_enabled: req.email_notifications_enabled,
    };

    let user = match req.invitation_token {
        Some(token) => {
            with_db(&state, move |db| db.register_with_invitation(&token, &new_user))
                .await
                .map_err(|e| match e {
                    ApiError::NotFound(_) => {
                        ApiError::NotFound("Invitation not found or already used".into())
                    }
                    other => other,
                })?
        }
        None => with_db(&state, move |db| db.create_user(&new_user)).await?,
    };

    let token = create_token(&state, &user)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.clone();
    let row = with_db(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&row.password)
        .map_err(|e| ApiError::Internal(format!("stored password hash unreadable: {}", e)))?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!("Failed login for {}", row.user.id);
        return Err(ApiError::Unauthorized);
    }

    let token = create_token(&state, &row.user)?;

    Ok(Json(AuthResponse {
        user: row.user,
        token,
    }))
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Argon2id with a fresh salt.
pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

fn create_token(state: &AppStateInner, user: &User) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user.id,
        name: user.name.clone(),
        role: user.role,
        exp: (chrono::Utc::now() + chrono::Duration::days(state.token_ttl_days)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token encoding failed: {}", e)))
}
