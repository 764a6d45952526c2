//! Interval poller feeding the training store.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::Instrument;

use super::store::TrainingStore;
use crate::api::ChurnApi;

struct RunningPoll {
    project_id: Option<String>,
    handle: JoinHandle<()>,
}

/// Polls the training status endpoint for one project at a time.
///
/// Polling runs on a fixed interval with no backoff and ends on its own once
/// the server reports a terminal status. Must be started from within a tokio
/// runtime.
pub struct TrainingMonitor {
    api: Arc<dyn ChurnApi>,
    store: Arc<TrainingStore>,
    interval: Duration,
    running: Mutex<Option<RunningPoll>>,
}

impl TrainingMonitor {
    pub fn new(api: Arc<dyn ChurnApi>, store: Arc<TrainingStore>, interval: Duration) -> Self {
        Self {
            api,
            store,
            interval,
            running: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<TrainingStore> {
        &self.store
    }

    fn running(&self) -> MutexGuard<'_, Option<RunningPoll>> {
        match self.running.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Training monitor lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Starts polling `project_id`, replacing any poller already running.
    pub fn start(&self, project_id: Option<&str>) {
        let mut running = self.running();
        if let Some(previous) = running.take() {
            previous.handle.abort();
        }

        let api = Arc::clone(&self.api);
        let store = Arc::clone(&self.store);
        let interval = self.interval;
        let project = project_id.map(str::to_string);
        let span = tracing::info_span!(
            "training_poll",
            project = project.as_deref().unwrap_or("active")
        );

        let task_project = project.clone();
        let handle = tokio::spawn(
            async move {
                let mut timer = tokio::time::interval(interval);
                loop {
                    timer.tick().await;
                    match api.training_status(task_project.as_deref()).await {
                        Ok(status) => {
                            let terminal = status.status.is_terminal();
                            tracing::debug!(status = ?status.status, "Training status polled");
                            store.update(task_project.as_deref(), status);
                            if terminal {
                                tracing::info!("Training reached a terminal state, polling stopped");
                                break;
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "Training status poll failed"),
                    }
                }
            }
            .instrument(span),
        );

        *running = Some(RunningPoll {
            project_id: project,
            handle,
        });
    }

    /// Aborts the running poller, if any.
    pub fn stop(&self) {
        if let Some(previous) = self.running().take() {
            previous.handle.abort();
            tracing::debug!(
                project = previous.project_id.as_deref().unwrap_or("active"),
                "Training polling stopped"
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.running()
            .as_ref()
            .is_some_and(|poll| !poll.handle.is_finished())
    }

    /// Project of the current poller (`Some(None)` for the active project).
    pub fn monitored_project(&self) -> Option<Option<String>> {
        self.running().as_ref().map(|poll| poll.project_id.clone())
    }
}

impl Drop for TrainingMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
