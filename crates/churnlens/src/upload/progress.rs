//! Stage and progress reporting for upload sessions.

use serde::Serialize;
use tokio::sync::broadcast;

use super::state::UploadStage;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UploadEvent {
    Stage {
        session_id: String,
        stage: UploadStage,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Progress {
        session_id: String,
        percent: u8,
    },
}

/// Receives every stage change and progress tick of a session.
pub trait UploadProgress: Send + Sync {
    fn stage(&self, session_id: &str, stage: UploadStage, message: Option<&str>);
    fn progress(&self, session_id: &str, percent: u8);
}

/// Discards all events.
pub struct NoopProgress;

impl UploadProgress for NoopProgress {
    fn stage(&self, _session_id: &str, _stage: UploadStage, _message: Option<&str>) {}
    fn progress(&self, _session_id: &str, _percent: u8) {}
}

/// Fans events out over a tokio broadcast channel.
#[derive(Clone)]
pub struct BroadcastProgress {
    sender: broadcast::Sender<UploadEvent>,
}

impl BroadcastProgress {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.sender.subscribe()
    }

    fn send(&self, event: UploadEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }
}

impl Default for BroadcastProgress {
    fn default() -> Self {
        Self::new(256)
    }
}

impl UploadProgress for BroadcastProgress {
    fn stage(&self, session_id: &str, stage: UploadStage, message: Option<&str>) {
        self.send(UploadEvent::Stage {
            session_id: session_id.to_string(),
            stage,
            message: message.map(str::to_string),
        });
    }

    fn progress(&self, session_id: &str, percent: u8) {
        self.send(UploadEvent::Progress {
            session_id: session_id.to_string(),
            percent,
        });
    }
}
