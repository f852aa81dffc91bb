use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Category, Gender, Priority, Role, User};

// -- JWT Claims --

/// JWT claims. Identity and role come from here on every request; there is
/// no server-side session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Token from an invitation link; decides the role of the new account.
    pub invitation_token: Option<String>,
    pub email_notifications_enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

// -- Users --

/// Profile changes. Role is deliberately not part of this payload.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub role_description: Option<String>,
    pub email_notifications_enabled: Option<bool>,
    pub password: Option<String>,
}

// -- Children --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateChildRequest {
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateChildRequest {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

// -- Gifts --

/// New gift. Missing fields fall back to the defaults the UI uses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateGiftRequest {
    pub title: Option<String>,
    pub purpose: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    pub shop_url: Option<String>,
    pub child_name: String,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
}

/// Partial gift edit. Unknown keys such as `id`, `createdAt` or the
/// reservation fields are dropped by serde and never reach the store.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGiftRequest {
    pub title: Option<String>,
    pub purpose: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub currency: Option<String>,
    pub image_url: Option<String>,
    pub shop_url: Option<String>,
    pub child_name: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProxyMarkRequest {
    pub proxy_name: String,
}

// -- Invitations --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateInvitationRequest {
    pub guest_name: String,
    #[serde(default)]
    pub guest_role_description: String,
    pub target_role: Role,
    pub custom_message: Option<String>,
}

// -- Contacts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
}

// -- Suggestions --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub child_name: String,
    pub age: String,
    pub interests: String,
    pub budget: String,
    pub gender: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftSuggestion {
    pub title: String,
    pub description: String,
    pub estimated_price_range: String,
}

// -- Generic --

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
