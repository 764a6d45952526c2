//! Upload orchestration: select, map, validate, decide, transmit.

pub mod progress;
pub mod session;
pub mod state;

pub use progress::{BroadcastProgress, NoopProgress, UploadEvent, UploadProgress};
pub use session::{SubmitOutcome, UploadReport, UploadSession};
pub use state::{Decision, UploadStage};
