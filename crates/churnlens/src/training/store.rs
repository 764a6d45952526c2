//! Shared training-status store with change notifications.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tokio::sync::broadcast;

use crate::model::TrainingStatus;

/// Emitted whenever the status of a project changes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingEvent {
    /// `None` is the server's currently active project.
    pub project_id: Option<String>,
    pub status: TrainingStatus,
}

/// Last known training status per project.
pub struct TrainingStore {
    statuses: RwLock<HashMap<Option<String>, TrainingStatus>>,
    sender: broadcast::Sender<TrainingEvent>,
}

impl TrainingStore {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            statuses: RwLock::new(HashMap::new()),
            sender,
        }
    }

    /// Stores `status` and notifies subscribers when it differs from the
    /// previous value.
    pub fn update(&self, project_id: Option<&str>, status: TrainingStatus) {
        let key = project_id.map(str::to_string);
        let changed = {
            let mut statuses = self.write_statuses();
            let changed = statuses.get(&key) != Some(&status);
            statuses.insert(key.clone(), status.clone());
            changed
        };

        if changed {
            // No receivers is fine
            let _ = self.sender.send(TrainingEvent {
                project_id: key,
                status,
            });
        }
    }

    pub fn get(&self, project_id: Option<&str>) -> Option<TrainingStatus> {
        self.read_statuses()
            .get(&project_id.map(str::to_string))
            .cloned()
    }

    pub fn clear(&self, project_id: Option<&str>) {
        self.write_statuses().remove(&project_id.map(str::to_string));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TrainingEvent> {
        self.sender.subscribe()
    }

    fn read_statuses(&self) -> RwLockReadGuard<'_, HashMap<Option<String>, TrainingStatus>> {
        match self.statuses.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Training store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_statuses(&self) -> RwLockWriteGuard<'_, HashMap<Option<String>, TrainingStatus>> {
        match self.statuses.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Training store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl Default for TrainingStore {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrainingState;

    #[test]
    fn test_update_and_get_per_project() {
        let store = TrainingStore::default();
        store.update(Some("p1"), TrainingStatus::new(TrainingState::Queued));
        store.update(None, TrainingStatus::new(TrainingState::Complete));

        assert_eq!(
            store.get(Some("p1")).map(|s| s.status),
            Some(TrainingState::Queued)
        );
        assert_eq!(store.get(None).map(|s| s.status), Some(TrainingState::Complete));
        assert!(store.get(Some("p2")).is_none());

        store.clear(Some("p1"));
        assert!(store.get(Some("p1")).is_none());
    }

    #[test]
    fn test_only_changes_are_broadcast() {
        let store = TrainingStore::default();
        let mut rx = store.subscribe();

        store.update(Some("p1"), TrainingStatus::new(TrainingState::InProgress));
        store.update(Some("p1"), TrainingStatus::new(TrainingState::InProgress));
        store.update(Some("p1"), TrainingStatus::new(TrainingState::Complete));

        let first = rx.try_recv().unwrap();
        assert_eq!(first.project_id.as_deref(), Some("p1"));
        assert_eq!(first.status.status, TrainingState::InProgress);
        assert_eq!(rx.try_recv().unwrap().status.status, TrainingState::Complete);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_clear_recovers_poisoned_lock() {
        let store = TrainingStore::default();
        store.update(Some("p1"), TrainingStatus::new(TrainingState::Queued));

        let poisoner = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = store.statuses.write().unwrap();
                    panic!("worker died while holding the lock");
                })
                .join()
        });
        assert!(poisoner.is_err());
        assert!(store.statuses.is_poisoned());

        store.clear(Some("p1"));
        assert!(store.get(Some("p1")).is_none());
    }
}
