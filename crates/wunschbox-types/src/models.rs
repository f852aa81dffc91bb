use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Returned when a stored or submitted enum value is not one we know.
#[derive(Debug, Clone, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// -- Enums --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Parent,
    Relative,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "PARENT",
            Self::Relative => "RELATIVE",
        }
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PARENT" => Ok(Self::Parent),
            "RELATIVE" => Ok(Self::Relative),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort weight: HIGH=3 > MEDIUM=2 > LOW=1.
    pub fn weight(&self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            other => Err(ParseEnumError::new("priority", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Other => "OTHER",
        }
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            "OTHER" => Ok(Self::Other),
            other => Err(ParseEnumError::new("gender", other)),
        }
    }
}

/// Gift categories. The wire names are the German labels the UI shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Spielzeug,
    Kleidung,
    #[serde(rename = "Bücher")]
    Buecher,
    Schule,
    Sport,
    Elektronik,
    Erlebnis,
    Sonstiges,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spielzeug => "Spielzeug",
            Self::Kleidung => "Kleidung",
            Self::Buecher => "Bücher",
            Self::Schule => "Schule",
            Self::Sport => "Sport",
            Self::Elektronik => "Elektronik",
            Self::Erlebnis => "Erlebnis",
            Self::Sonstiges => "Sonstiges",
        }
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Spielzeug" => Ok(Self::Spielzeug),
            "Kleidung" => Ok(Self::Kleidung),
            "Bücher" => Ok(Self::Buecher),
            "Schule" => Ok(Self::Schule),
            "Sport" => Ok(Self::Sport),
            "Elektronik" => Ok(Self::Elektronik),
            "Erlebnis" => Ok(Self::Erlebnis),
            "Sonstiges" => Ok(Self::Sonstiges),
            other => Err(ParseEnumError::new("category", other)),
        }
    }
}

// -- Entities --

/// A registered account. The password hash never leaves the DB crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications_enabled: Option<bool>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: Uuid,
    pub name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    pub created_by_user_id: Uuid,
}

/// Reservation state of a gift, derived from `is_gifted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftState {
    Open,
    Reserved,
}

/// A wish on the list. `created_at` is epoch milliseconds.
///
/// `is_gifted`, `gifted_by_user_id` and `gifted_by_user_name` are either all
/// set or all clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gift {
    pub id: Uuid,
    pub title: String,
    pub purpose: String,
    pub price_min: f64,
    pub price_max: f64,
    pub currency: String,
    pub image_url: String,
    pub shop_url: String,
    pub child_name: String,
    pub priority: Priority,
    pub category: Category,
    pub is_gifted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gifted_by_user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gifted_by_user_name: Option<String>,
    pub created_at: i64,
}

impl Gift {
    pub fn state(&self) -> GiftState {
        if self.is_gifted {
            GiftState::Reserved
        } else {
            GiftState::Open
        }
    }

    /// True when the reservation fields agree with each other.
    pub fn reservation_consistent(&self) -> bool {
        match self.is_gifted {
            true => self.gifted_by_user_id.is_some() && self.gifted_by_user_name.is_some(),
            false => self.gifted_by_user_id.is_none() && self.gifted_by_user_name.is_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: Uuid,
    pub token: String,
    pub guest_name: String,
    pub guest_role_description: String,
    pub target_role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
    pub created_by_user_id: Uuid,
    pub created_at: i64,
    pub is_used: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub created_at: i64,
    pub read: bool,
    pub for_role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_by_user_id: Uuid,
}
