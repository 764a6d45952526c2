use serde::{Deserialize, Serialize};

/// Position of an upload session in its lifecycle.
///
/// `Error` is reachable from every other stage; a new submit leaves it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    #[default]
    Idle,
    Validating,
    AwaitingDecision,
    Uploading,
    Training,
    Complete,
    Error,
}

impl UploadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStage::Idle => "idle",
            UploadStage::Validating => "validating",
            UploadStage::AwaitingDecision => "awaiting_decision",
            UploadStage::Uploading => "uploading",
            UploadStage::Training => "training",
            UploadStage::Complete => "complete",
            UploadStage::Error => "error",
        }
    }

    /// Stages that end a submit attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadStage::Training | UploadStage::Complete | UploadStage::Error
        )
    }
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadStage::Idle => write!(f, "Idle"),
            UploadStage::Validating => write!(f, "Validating"),
            UploadStage::AwaitingDecision => write!(f, "Awaiting decision"),
            UploadStage::Uploading => write!(f, "Uploading"),
            UploadStage::Training => write!(f, "Training"),
            UploadStage::Complete => write!(f, "Complete"),
            UploadStage::Error => write!(f, "Error"),
        }
    }
}

/// The user's answer to a failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Re-read the whole file, repair it and upload the result.
    AutoFix,
    /// Upload the data exactly as read.
    UploadAnyway,
    Cancel,
}
