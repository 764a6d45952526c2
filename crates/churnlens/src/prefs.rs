//! Persisted user preferences behind an injectable store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::db::{preference_repo, Database};
use crate::error::PreferenceError;
use crate::model::DataMode;

pub const DATA_MODE_KEY: &str = "settings.dataMode";
pub const ACTIVE_DATASET_KEY: &str = "activeDatasetId";

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
    fn remove(&self, key: &str) -> Result<(), PreferenceError>;
}

/// Process-local store, used in tests and when no database is configured.
#[derive(Default)]
pub struct MemoryPreferences {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let values = self
            .values
            .read()
            .map_err(|_| PreferenceError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| PreferenceError::LockPoisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| PreferenceError::LockPoisoned)?;
        values.remove(key);
        Ok(())
    }
}

pub struct SqlitePreferences {
    db: Database,
}

impl SqlitePreferences {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl PreferenceStore for SqlitePreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(preference_repo::get(&self.db, key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        Ok(preference_repo::set(&self.db, key, value)?)
    }

    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        preference_repo::remove(&self.db, key)?;
        Ok(())
    }
}

/// Typed accessors over a [`PreferenceStore`].
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPreferences::new()))
    }

    /// Stored data mode, `wage` when unset.
    pub fn data_mode(&self) -> Result<DataMode, PreferenceError> {
        match self.store.get(DATA_MODE_KEY)? {
            Some(value) => DataMode::parse(&value).ok_or(PreferenceError::InvalidValue {
                key: DATA_MODE_KEY.to_string(),
                value,
            }),
            None => Ok(DataMode::default()),
        }
    }

    pub fn set_data_mode(&self, mode: DataMode) -> Result<(), PreferenceError> {
        self.store.set(DATA_MODE_KEY, mode.as_str())
    }

    pub fn active_dataset_id(&self) -> Result<Option<String>, PreferenceError> {
        self.store.get(ACTIVE_DATASET_KEY)
    }

    pub fn set_active_dataset_id(&self, id: Option<&str>) -> Result<(), PreferenceError> {
        match id {
            Some(id) => self.store.set(ACTIVE_DATASET_KEY, id),
            None => self.store.remove(ACTIVE_DATASET_KEY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_mode_defaults_to_wage() {
        let prefs = Preferences::in_memory();
        assert_eq!(prefs.data_mode().unwrap(), DataMode::Wage);

        prefs.set_data_mode(DataMode::Performance).unwrap();
        assert_eq!(prefs.data_mode().unwrap(), DataMode::Performance);
    }

    #[test]
    fn test_invalid_stored_mode() {
        let store = Arc::new(MemoryPreferences::new());
        store.set(DATA_MODE_KEY, "hourly").unwrap();

        match Preferences::new(store).data_mode() {
            Err(PreferenceError::InvalidValue { value, .. }) => assert_eq!(value, "hourly"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_active_dataset_cleared() {
        let prefs = Preferences::in_memory();
        prefs.set_active_dataset_id(Some("ds-1")).unwrap();
        assert_eq!(prefs.active_dataset_id().unwrap().as_deref(), Some("ds-1"));

        prefs.set_active_dataset_id(None).unwrap();
        assert!(prefs.active_dataset_id().unwrap().is_none());
    }

    #[test]
    fn test_sqlite_store() {
        let db = Database::open_in_memory().unwrap();
        let prefs = Preferences::new(Arc::new(SqlitePreferences::new(db.clone())));
        prefs.set_data_mode(DataMode::Performance).unwrap();

        assert_eq!(
            preference_repo::get(&db, DATA_MODE_KEY).unwrap().as_deref(),
            Some("performance")
        );
        assert_eq!(prefs.data_mode().unwrap(), DataMode::Performance);
    }
}
