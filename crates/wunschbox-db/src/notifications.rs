use rusqlite::{Connection, params};
use uuid::Uuid;

use wunschbox_types::models::{Notification, Role};

use crate::error::StoreResult;
use crate::models::{NOTIFICATION_COLUMNS, notification_row};
use crate::{Database, now_millis};

impl Database {
    pub fn append_notification(&self, message: &str, for_role: Role) -> StoreResult<Notification> {
        self.with_conn(|conn| insert_notification(conn, message, for_role))
    }

    /// Newest first, no paging.
    pub fn list_notifications(&self, role: Role) -> StoreResult<Vec<Notification>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM notifications WHERE for_role = ?1 ORDER BY created_at DESC, rowid DESC",
                NOTIFICATION_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([role.as_str()], notification_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Marks every notification of `role` as read. Returns how many changed.
    pub fn mark_notifications_read(&self, role: Role) -> StoreResult<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notifications SET read = 1 WHERE for_role = ?1 AND read = 0",
                [role.as_str()],
            )?;
            Ok(changed)
        })
    }
}

/// Shared with the reservation path, which appends inside its own transaction.
pub(crate) fn insert_notification(
    conn: &Connection,
    message: &str,
    for_role: Role,
) -> StoreResult<Notification> {
    let notification = Notification {
        id: Uuid::new_v4(),
        message: message.to_string(),
        created_at: now_millis(),
        read: false,
        for_role,
    };

    conn.execute(
        "INSERT INTO notifications (id, message, created_at, read, for_role) VALUES (?1, ?2, ?3, 0, ?4)",
        params![
            notification.id.to_string(),
            notification.message,
            notification.created_at,
            for_role.as_str()
        ],
    )?;

    Ok(notification)
}
