use rusqlite::params;
use uuid::Uuid;

use wunschbox_types::api::CreateContactRequest;
use wunschbox_types::models::Contact;

use crate::Database;
use crate::error::{StoreError, StoreResult, require_text};
use crate::models::{CONTACT_COLUMNS, contact_row};

// Address book entries are private to the user who created them.
impl Database {
    pub fn create_contact(&self, owner_id: Uuid, req: &CreateContactRequest) -> StoreResult<Contact> {
        require_text("name", &req.name)?;
        require_text("email", &req.email)?;

        let contact = Contact {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            created_by_user_id: owner_id,
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO contacts (id, name, email, created_by) VALUES (?1, ?2, ?3, ?4)",
                params![
                    contact.id.to_string(),
                    contact.name,
                    contact.email,
                    owner_id.to_string()
                ],
            )?;
            Ok(())
        })?;

        Ok(contact)
    }

    pub fn list_contacts(&self, owner_id: Uuid) -> StoreResult<Vec<Contact>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM contacts WHERE created_by = ?1 ORDER BY name",
                CONTACT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([owner_id.to_string()], contact_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Someone else's contact is reported as NotFound.
    pub fn delete_contact(&self, id: Uuid, owner_id: Uuid) -> StoreResult<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM contacts WHERE id = ?1 AND created_by = ?2",
                params![id.to_string(), owner_id.to_string()],
            )?;
            if deleted == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }
}
