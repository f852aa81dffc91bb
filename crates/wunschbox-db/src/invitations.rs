use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;
use uuid::Uuid;

use wunschbox_types::api::CreateInvitationRequest;
use wunschbox_types::models::Invitation;

use crate::error::{StoreError, StoreResult, require_text};
use crate::models::{INVITATION_COLUMNS, invitation_row};
use crate::{Database, now_millis};

/// 256 bits from the thread-local CSPRNG.
const TOKEN_BYTES: usize = 32;

impl Database {
    pub fn create_invitation(
        &self,
        issuer_id: Uuid,
        req: &CreateInvitationRequest,
    ) -> StoreResult<Invitation> {
        require_text("guestName", &req.guest_name)?;

        let invitation = Invitation {
            id: Uuid::new_v4(),
            token: generate_token(),
            guest_name: req.guest_name.trim().to_string(),
            guest_role_description: req.guest_role_description.trim().to_string(),
            target_role: req.target_role,
            custom_message: req
                .custom_message
                .clone()
                .filter(|m| !m.trim().is_empty()),
            created_by_user_id: issuer_id,
            created_at: now_millis(),
            is_used: false,
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO invitations (id, token, guest_name, guest_role_description, target_role,
                                          custom_message, created_by, created_at, is_used)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0)",
                params![
                    invitation.id.to_string(),
                    invitation.token,
                    invitation.guest_name,
                    invitation.guest_role_description,
                    invitation.target_role.as_str(),
                    invitation.custom_message,
                    issuer_id.to_string(),
                    invitation.created_at,
                ],
            )?;
            Ok(())
        })?;

        info!(
            "Invitation {} issued by {} for a {}",
            invitation.id, issuer_id, invitation.target_role
        );
        Ok(invitation)
    }

    /// Unused invitation for `token`. Used and unknown tokens both give
    /// NotFound so callers cannot tell which tokens ever existed.
    pub fn lookup_invitation(&self, token: &str) -> StoreResult<Invitation> {
        self.with_conn(|conn| lookup_open(conn, token)?.ok_or(StoreError::NotFound))
    }

    /// Marks the invitation used. Calling it twice is not an error; the
    /// registration flow guards against double use by re-checking the token
    /// in the same transaction (`register_with_invitation`).
    pub fn redeem_invitation(&self, id: Uuid) -> StoreResult<()> {
        self.with_conn(|conn| mark_used(conn, id))
    }

    /// Invitations issued by one parent, newest first.
    pub fn list_invitations_by(&self, issuer_id: Uuid) -> StoreResult<Vec<Invitation>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM invitations WHERE created_by = ?1 ORDER BY created_at DESC, rowid DESC",
                INVITATION_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([issuer_id.to_string()], invitation_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

pub(crate) fn lookup_open(conn: &Connection, token: &str) -> StoreResult<Option<Invitation>> {
    let sql = format!(
        "SELECT {} FROM invitations WHERE token = ?1 AND is_used = 0",
        INVITATION_COLUMNS
    );
    let invitation = conn.query_row(&sql, [token], invitation_row).optional()?;
    Ok(invitation)
}

pub(crate) fn mark_used(conn: &Connection, id: Uuid) -> StoreResult<()> {
    let changed = conn.execute(
        "UPDATE invitations SET is_used = 1 WHERE id = ?1",
        [id.to_string()],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
