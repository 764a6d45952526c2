//! Key/value rows of the `preferences` table.

use rusqlite::{params, OptionalExtension};

use super::{Database, DatabaseError};

pub fn get(db: &Database, key: &str) -> Result<Option<String>, DatabaseError> {
    db.with_conn(|conn| {
        let value = conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value)
    })
}

/// Inserts or replaces the value stored under `key`.
pub fn set(db: &Database, key: &str, value: &str) -> Result<(), DatabaseError> {
    let now = chrono::Utc::now().to_rfc3339();
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    })
}

/// Returns whether a row was deleted.
pub fn remove(db: &Database, key: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    })
}

pub fn list(db: &Database) -> Result<Vec<(String, String)>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT key, value FROM preferences ORDER BY key")?;
        let rows = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
