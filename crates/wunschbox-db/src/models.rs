//! Row mapping. Ids, enums and dates are stored as TEXT and parsed on read;
//! a value that fails to parse surfaces as a conversion error, not a panic.

use std::str::FromStr;

use rusqlite::Row;
use rusqlite::types::Type;
use uuid::Uuid;

use wunschbox_types::models::{Child, Contact, Gift, Invitation, Notification, Role, User};

/// User row including the password hash, which `User` does not carry.
pub struct UserRow {
    pub user: User,
    pub password: String,
}

pub(crate) const USER_COLUMNS: &str =
    "id, name, email, role, role_description, email_notifications, created_at, password";

pub(crate) const CHILD_COLUMNS: &str = "id, name, birth_date, gender, created_by";

pub(crate) const GIFT_COLUMNS: &str = "id, title, purpose, price_min, price_max, currency, image_url, shop_url, \
     child_name, priority, category, is_gifted, gifted_by_user_id, gifted_by_user_name, created_at";

pub(crate) const INVITATION_COLUMNS: &str = "id, token, guest_name, guest_role_description, target_role, \
     custom_message, created_by, created_at, is_used";

pub(crate) const NOTIFICATION_COLUMNS: &str = "id, message, created_at, read, for_role";

pub(crate) const CONTACT_COLUMNS: &str = "id, name, email, created_by";

/// Parses a TEXT column through `FromStr`.
pub(crate) fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parsed_opt<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

pub(crate) fn user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        user: User {
            id: parsed(row, 0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            role: parsed(row, 3)?,
            role_description: row.get(4)?,
            email_notifications_enabled: row.get(5)?,
            created_at: row.get(6)?,
        },
        password: row.get(7)?,
    })
}

pub(crate) fn child_row(row: &Row<'_>) -> rusqlite::Result<Child> {
    Ok(Child {
        id: parsed(row, 0)?,
        name: row.get(1)?,
        birth_date: parsed(row, 2)?,
        gender: parsed(row, 3)?,
        created_by_user_id: parsed(row, 4)?,
    })
}

pub(crate) fn gift_row(row: &Row<'_>) -> rusqlite::Result<Gift> {
    Ok(Gift {
        id: parsed(row, 0)?,
        title: row.get(1)?,
        purpose: row.get(2)?,
        price_min: row.get(3)?,
        price_max: row.get(4)?,
        currency: row.get(5)?,
        image_url: row.get(6)?,
        shop_url: row.get(7)?,
        child_name: row.get(8)?,
        priority: parsed(row, 9)?,
        category: parsed(row, 10)?,
        is_gifted: row.get(11)?,
        gifted_by_user_id: parsed_opt::<Uuid>(row, 12)?,
        gifted_by_user_name: row.get(13)?,
        created_at: row.get(14)?,
    })
}

pub(crate) fn invitation_row(row: &Row<'_>) -> rusqlite::Result<Invitation> {
    Ok(Invitation {
        id: parsed(row, 0)?,
        token: row.get(1)?,
        guest_name: row.get(2)?,
        guest_role_description: row.get(3)?,
        target_role: parsed(row, 4)?,
        custom_message: row.get(5)?,
        created_by_user_id: parsed(row, 6)?,
        created_at: row.get(7)?,
        is_used: row.get(8)?,
    })
}

pub(crate) fn notification_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: parsed(row, 0)?,
        message: row.get(1)?,
        created_at: row.get(2)?,
        read: row.get(3)?,
        for_role: parsed::<Role>(row, 4)?,
    })
}

pub(crate) fn contact_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: parsed(row, 0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_by_user_id: parsed(row, 3)?,
    })
}
