//! Local SQLite store holding preferences and upload history.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

pub mod error;
pub mod migrations;
pub mod preference_repo;
pub mod upload_repo;

pub use error::DatabaseError;

/// Handle to the local store. Cloning shares the one connection, and every
/// call holds its lock for the duration of the closure.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the store at `path`, creating the file and its directory when
    /// missing, and upgrades the schema.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| DatabaseError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Self::from_connection(conn)?;
        log::info!("Local store ready at {}", path.display());
        Ok(db)
    }

    /// Store that disappears with the process.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::run_all(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&conn)
    }

    pub fn schema_version(&self) -> Result<u32, DatabaseError> {
        self.with_conn(migrations::current_version)
    }
}

/// `~/.churnlens/data/churnlens.db`
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".churnlens").join("data").join("churnlens.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_is_migrated() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.schema_version().unwrap() >= 2);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile").join("churnlens.db");

        let db = Database::open(&path).unwrap();
        preference_repo::set(&db, "settings.dataMode", "performance").unwrap();
        drop(db);
        assert!(path.exists());

        let db = Database::open(&path).unwrap();
        assert_eq!(
            preference_repo::get(&db, "settings.dataMode").unwrap().as_deref(),
            Some("performance")
        );
    }

    #[test]
    fn test_clones_share_state() {
        let db = Database::open_in_memory().unwrap();
        let other = db.clone();
        preference_repo::set(&db, "activeDatasetId", "ds-1").unwrap();
        assert_eq!(
            preference_repo::get(&other, "activeDatasetId").unwrap().as_deref(),
            Some("ds-1")
        );
    }

    #[test]
    fn test_default_path_is_under_home() {
        let path = default_database_path().unwrap();
        assert!(path.ends_with(".churnlens/data/churnlens.db"));
    }
}
