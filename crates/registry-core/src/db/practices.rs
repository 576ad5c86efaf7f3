//! Practice and user-allow-list storage operations.
//!
//! The directory surface of the crate is read-only; the writes here exist so
//! admin tooling and tests can seed the store.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::Practice;

impl Database {
    /// Insert or rename a practice.
    pub fn upsert_practice(&self, id: &str, name: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO practices (id, name) VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name
            "#,
            params![id, name],
        )?;
        Ok(())
    }

    /// Get a practice by id.
    pub fn get_practice(&self, id: &str) -> DbResult<Option<Practice>> {
        self.conn
            .query_row(
                "SELECT id, name FROM practices WHERE id = ?",
                [id],
                |row| {
                    Ok(Practice {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Replace a user's practice allow-list.
    pub fn set_allowed_practices(&self, user_id: &str, practice_ids: &[String]) -> DbResult<()> {
        let allowed_json = serde_json::to_string(practice_ids)?;
        self.conn.execute(
            r#"
            INSERT INTO users (id, allowed_practices, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                allowed_practices = excluded.allowed_practices,
                updated_at = datetime('now')
            "#,
            params![user_id, allowed_json],
        )?;
        Ok(())
    }

    /// Get a user's practice allow-list. `None` when the user document
    /// does not exist at all.
    pub fn allowed_practices(&self, user_id: &str) -> DbResult<Option<Vec<String>>> {
        let allowed_json: Option<String> = self
            .conn
            .query_row(
                "SELECT allowed_practices FROM users WHERE id = ?",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;

        allowed_json
            .map(|json| serde_json::from_str(&json).map_err(Into::into))
            .transpose()
    }
}
