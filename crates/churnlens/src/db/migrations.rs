//! Versioned schema for the local store.
//!
//! `schema_version` records every script that has run. Scripts are applied
//! in ascending order, one transaction each.

use rusqlite::{params, Connection};

use super::error::DatabaseError;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "preferences",
        sql: include_str!("sql/001_create_preferences.sql"),
    },
    SchemaStep {
        version: 2,
        name: "upload_history",
        sql: include_str!("sql/002_create_uploads.sql"),
    },
];

/// Highest version recorded in `schema_version`, 0 on a fresh file.
pub fn current_version(conn: &Connection) -> Result<u32, DatabaseError> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?)
}

/// Brings the schema up to the latest version.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let applied = current_version(conn)?;
    for step in STEPS.iter().filter(|s| s.version > applied) {
        log::info!("Applying schema v{} ({})", step.version, step.name);
        apply(conn, step).map_err(|e| DatabaseError::Migration {
            version: step.version,
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn apply(conn: &Connection, step: &SchemaStep) -> Result<(), rusqlite::Error> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(step.sql)?;
    tx.execute(
        "INSERT INTO schema_version (version, name) VALUES (?1, ?2)",
        params![step.version, step.name],
    )?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let names = stmt
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        names
    }

    #[test]
    fn test_fresh_store_reaches_latest_version() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();

        assert_eq!(current_version(&conn).unwrap(), STEPS.len() as u32);
        let names = tables(&conn);
        assert!(names.contains(&"preferences".to_string()));
        assert!(names.contains(&"uploads".to_string()));
    }

    #[test]
    fn test_rerun_applies_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        run_all(&conn).unwrap();

        let rows: u32 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, STEPS.len() as u32);
    }

    #[test]
    fn test_partial_store_is_completed() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_version (version INTEGER PRIMARY KEY, name TEXT NOT NULL, applied_at TEXT NOT NULL DEFAULT (datetime('now')));",
        )
        .unwrap();
        conn.execute_batch(STEPS[0].sql).unwrap();
        conn.execute(
            "INSERT INTO schema_version (version, name) VALUES (1, 'preferences')",
            [],
        )
        .unwrap();

        run_all(&conn).unwrap();
        assert!(tables(&conn).contains(&"uploads".to_string()));
    }
}
