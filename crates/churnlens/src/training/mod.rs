pub mod monitor;
pub mod store;

pub use monitor::TrainingMonitor;
pub use store::{TrainingEvent, TrainingStore};
