use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::info;
use uuid::Uuid;

use wunschbox_types::models::{Role, User};

use crate::error::{StoreError, StoreResult, require_text};
use crate::invitations::{lookup_open, mark_used};
use crate::models::{USER_COLUMNS, UserRow, user_row};
use crate::{Database, now_millis};

/// Account data for registration; the hash is computed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub email_notifications_enabled: Option<bool>,
}

/// Profile changes. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub role_description: Option<String>,
    pub email_notifications_enabled: Option<bool>,
    pub password_hash: Option<String>,
}

impl Database {
    // -- Registration --

    /// Self-registration without an invitation always yields a parent.
    pub fn create_user(&self, new: &NewUser) -> StoreResult<User> {
        let user = build_user(new, Role::Parent, None)?;
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            insert_user(&tx, &user, &new.password_hash)?;
            tx.commit()?;
            Ok(())
        })?;

        info!("User {} registered as {}", user.id, user.role);
        Ok(user)
    }

    /// Redeems an invitation token and creates the invited account in one
    /// transaction. The token is re-checked inside the transaction, so of two
    /// concurrent redemptions only the first commits; the other sees NotFound.
    pub fn register_with_invitation(&self, token: &str, new: &NewUser) -> StoreResult<User> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let invitation = lookup_open(&tx, token)?.ok_or(StoreError::NotFound)?;
            let user = build_user(
                new,
                invitation.target_role,
                Some(invitation.guest_role_description.clone()),
            )?;

            insert_user(&tx, &user, &new.password_hash)?;
            mark_used(&tx, invitation.id)?;
            tx.commit()?;

            info!(
                "Invitation {} redeemed by {} as {}",
                invitation.id, user.id, user.role
            );
            Ok(user)
        })
    }

    // -- Lookup --

    pub fn get_user_by_email(&self, email: &str) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
            let row = conn.query_row(&sql, [email.trim()], user_row).optional()?;
            Ok(row)
        })
    }

    pub fn get_user(&self, id: Uuid) -> StoreResult<User> {
        self.with_conn(|conn| query_user(conn, id)?.ok_or(StoreError::NotFound))
    }

    /// Users of `role` who opted in to email notifications.
    pub fn list_email_recipients(&self, role: Role) -> StoreResult<Vec<User>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM users WHERE role = ?1 AND email_notifications = 1 ORDER BY name",
                USER_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([role.as_str()], user_row)?
                .map(|r| r.map(|row| row.user))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Profile --

    pub fn update_user(&self, id: Uuid, patch: &UserPatch) -> StoreResult<User> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut user = query_user(&tx, id)?.ok_or(StoreError::NotFound)?;

            if let Some(name) = &patch.name {
                user.name = name.trim().to_string();
            }
            if let Some(desc) = &patch.role_description {
                user.role_description = Some(desc.clone()).filter(|d| !d.trim().is_empty());
            }
            if let Some(enabled) = patch.email_notifications_enabled {
                user.email_notifications_enabled = Some(enabled);
            }

            tx.execute(
                "UPDATE users SET name = ?2, role_description = ?3, email_notifications = ?4 WHERE id = ?1",
                params![
                    id.to_string(),
                    user.name,
                    user.role_description,
                    user.email_notifications_enabled
                ],
            )?;
            if let Some(hash) = &patch.password_hash {
                tx.execute(
                    "UPDATE users SET password = ?2 WHERE id = ?1",
                    params![id.to_string(), hash],
                )?;
            }
            tx.commit()?;

            Ok(user)
        })
    }

    /// Removes the account. Gifts it had reserved go back to OPEN; its
    /// contacts and issued invitations are removed by cascade.
    pub fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let released = tx.execute(
                "UPDATE gifts SET is_gifted = 0, gifted_by_user_id = NULL, gifted_by_user_name = NULL
                 WHERE gifted_by_user_id = ?1",
                [id.to_string()],
            )?;
            let deleted = tx.execute("DELETE FROM users WHERE id = ?1", [id.to_string()])?;
            if deleted == 0 {
                return Err(StoreError::NotFound);
            }
            tx.commit()?;

            info!("User {} deleted, {} reservations released", id, released);
            Ok(())
        })
    }
}

fn build_user(new: &NewUser, role: Role, role_description: Option<String>) -> StoreResult<User> {
    require_text("name", &new.name)?;
    let email = new.email.trim();
    if !email.contains('@') {
        return Err(StoreError::Invalid("email is not valid".into()));
    }

    // Parents get email notifications unless they said otherwise
    let email_notifications_enabled = match (role, new.email_notifications_enabled) {
        (_, Some(v)) => Some(v),
        (Role::Parent, None) => Some(true),
        (Role::Relative, None) => None,
    };

    Ok(User {
        id: Uuid::new_v4(),
        name: new.name.trim().to_string(),
        email: email.to_string(),
        role,
        role_description: role_description.filter(|d| !d.trim().is_empty()),
        email_notifications_enabled,
        created_at: now_millis(),
    })
}

fn insert_user(conn: &Connection, user: &User, password_hash: &str) -> StoreResult<()> {
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
        [&user.email],
        |r| r.get(0),
    )?;
    if taken {
        return Err(StoreError::Conflict("email already registered".into()));
    }

    conn.execute(
        "INSERT INTO users (id, name, email, password, role, role_description, email_notifications, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id.to_string(),
            user.name,
            user.email,
            password_hash,
            user.role.as_str(),
            user.role_description,
            user.email_notifications_enabled,
            user.created_at,
        ],
    )?;
    Ok(())
}

fn query_user(conn: &Connection, id: Uuid) -> StoreResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
    let row = conn.query_row(&sql, [id.to_string()], user_row).optional()?;
    Ok(row.map(|r| r.user))
}
