use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::info;
use uuid::Uuid;

use wunschbox_types::api::{CreateChildRequest, UpdateChildRequest};
use wunschbox_types::models::Child;

use crate::Database;
use crate::error::{StoreError, StoreResult, require_text};
use crate::models::{CHILD_COLUMNS, child_row};

impl Database {
    pub fn create_child(&self, creator_id: Uuid, req: &CreateChildRequest) -> StoreResult<Child> {
        require_text("name", &req.name)?;

        let child = Child {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            birth_date: req.birth_date,
            gender: req.gender,
            created_by_user_id: creator_id,
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO children (id, name, birth_date, gender, created_by) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    child.id.to_string(),
                    child.name,
                    child.birth_date.to_string(),
                    child.gender.as_str(),
                    creator_id.to_string(),
                ],
            )?;
            Ok(())
        })?;

        info!("Child {} added by {}", child.id, creator_id);
        Ok(child)
    }

    pub fn list_children(&self) -> StoreResult<Vec<Child>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM children ORDER BY name", CHILD_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], child_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_child(&self, id: Uuid, patch: &UpdateChildRequest) -> StoreResult<Child> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let sql = format!("SELECT {} FROM children WHERE id = ?1", CHILD_COLUMNS);
            let mut child = tx
                .query_row(&sql, [id.to_string()], child_row)
                .optional()?
                .ok_or(StoreError::NotFound)?;

            if let Some(name) = &patch.name {
                child.name = name.trim().to_string();
            }
            if let Some(birth_date) = patch.birth_date {
                child.birth_date = birth_date;
            }
            if let Some(gender) = patch.gender {
                child.gender = gender;
            }

            tx.execute(
                "UPDATE children SET name = ?2, birth_date = ?3, gender = ?4 WHERE id = ?1",
                params![
                    id.to_string(),
                    child.name,
                    child.birth_date.to_string(),
                    child.gender.as_str()
                ],
            )?;
            tx.commit()?;

            Ok(child)
        })
    }

    /// Gifts keep their `child_name`; they show up under the legacy name
    /// in `known_child_names` until edited.
    pub fn delete_child(&self, id: Uuid) -> StoreResult<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM children WHERE id = ?1", [id.to_string()])?;
            if deleted == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    /// Sorted union of registered child names and names still referenced by
    /// gifts, for the child filter.
    pub fn known_child_names(&self) -> StoreResult<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name FROM children
                 UNION
                 SELECT child_name FROM gifts WHERE child_name <> ''
                 ORDER BY 1",
            )?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(names)
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use wunschbox_types::api::CreateGiftRequest;
    use wunschbox_types::models::Gender;

    fn add(db: &Database, name: &str) -> Child {
        db.create_child(
            Uuid::new_v4(),
            &CreateChildRequest {
                name: name.into(),
                birth_date: NaiveDate::from_ymd_opt(2018, 5, 15).unwrap(),
                gender: Gender::Male,
            },
        )
        .unwrap()
    }

    #[test]
    fn create_update_delete() {
        let db = Database::open_in_memory().unwrap();
        let levin = add(&db, "Levin");

        let updated = db
            .update_child(
                levin.id,
                &UpdateChildRequest {
                    birth_date: NaiveDate::from_ymd_opt(2018, 6, 1),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Levin");
        assert_eq!(updated.birth_date.to_string(), "2018-06-01");
        assert_eq!(db.list_children().unwrap(), vec![updated]);

        db.delete_child(levin.id).unwrap();
        assert!(db.list_children().unwrap().is_empty());
        assert!(matches!(db.delete_child(levin.id), Err(StoreError::NotFound)));
    }

    #[test]
    fn known_names_include_legacy_gift_names() {
        let db = Database::open_in_memory().unwrap();
        add(&db, "Lina");
        add(&db, "Levin");
        for name in ["Lina", "Mira"] {
            db.create_gift(&CreateGiftRequest {
                child_name: name.into(),
                ..Default::default()
            })
            .unwrap();
        }

        assert_eq!(db.known_child_names().unwrap(), ["Levin", "Lina", "Mira"]);
    }
}
