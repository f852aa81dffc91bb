use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id                  TEXT PRIMARY KEY,
                name                TEXT NOT NULL,
                email               TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password            TEXT NOT NULL,
                role                TEXT NOT NULL CHECK (role IN ('PARENT', 'RELATIVE')),
                role_description    TEXT,
                email_notifications INTEGER,
                created_at          INTEGER NOT NULL
            );

            CREATE TABLE children (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                birth_date  TEXT NOT NULL,
                gender      TEXT NOT NULL CHECK (gender IN ('MALE', 'FEMALE', 'OTHER')),
                created_by  TEXT NOT NULL
            );

            CREATE TABLE gifts (
                id                  TEXT PRIMARY KEY,
                title               TEXT NOT NULL,
                purpose             TEXT NOT NULL DEFAULT '',
                price_min           REAL NOT NULL DEFAULT 0,
                price_max           REAL NOT NULL DEFAULT 0,
                currency            TEXT NOT NULL,
                image_url           TEXT NOT NULL DEFAULT '',
                shop_url            TEXT NOT NULL DEFAULT '',
                child_name          TEXT NOT NULL,
                priority            TEXT NOT NULL CHECK (priority IN ('HIGH', 'MEDIUM', 'LOW')),
                category            TEXT NOT NULL,
                is_gifted           INTEGER NOT NULL DEFAULT 0,
                gifted_by_user_id   TEXT,
                gifted_by_user_name TEXT,
                created_at          INTEGER NOT NULL,
                CHECK (
                    (is_gifted = 0 AND gifted_by_user_id IS NULL AND gifted_by_user_name IS NULL)
                    OR
                    (is_gifted = 1 AND gifted_by_user_id IS NOT NULL AND gifted_by_user_name IS NOT NULL)
                )
            );

            CREATE INDEX idx_gifts_gifted_by ON gifts(gifted_by_user_id);

            CREATE TABLE notifications (
                id          TEXT PRIMARY KEY,
                message     TEXT NOT NULL,
                created_at  INTEGER NOT NULL,
                read        INTEGER NOT NULL DEFAULT 0,
                for_role    TEXT NOT NULL CHECK (for_role IN ('PARENT', 'RELATIVE'))
            );

            CREATE INDEX idx_notifications_role ON notifications(for_role, created_at);

            CREATE TABLE invitations (
                id                      TEXT PRIMARY KEY,
                token                   TEXT NOT NULL UNIQUE,
                guest_name              TEXT NOT NULL,
                guest_role_description  TEXT NOT NULL DEFAULT '',
                target_role             TEXT NOT NULL CHECK (target_role IN ('PARENT', 'RELATIVE')),
                custom_message          TEXT,
                created_by              TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at              INTEGER NOT NULL,
                is_used                 INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE contacts (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL,
                created_by  TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX idx_contacts_owner ON contacts(created_by);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn gift_table_rejects_half_reserved_rows() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();

        let res = conn.execute(
            "INSERT INTO gifts (id, title, currency, child_name, priority, category, is_gifted, gifted_by_user_id, created_at)
             VALUES ('g1', 'LEGO', 'CHF', 'Lina', 'HIGH', 'Spielzeug', 1, 'u1', 0)",
            [],
        );
        assert!(res.is_err());
    }
}
