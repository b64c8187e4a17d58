use serde::{Deserialize, Serialize};

/// One event in a transfer's outbound stream.
///
/// A transfer emits zero or more `Progress` events (percent strictly
/// increasing, each value at most once) followed by exactly one terminal
/// event, `Complete` or `Error`. `name` identifies the transfer across all
/// three shapes; for downloads it is the resolved file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TransferEvent {
    #[serde(rename_all = "camelCase")]
    Progress {
        name: String,
        downloaded_bytes: u64,
        total_bytes: u64,
        percent: u32,
    },
    #[serde(rename_all = "camelCase")]
    Complete { name: String, final_path: String },
    Error { name: String, message: String },
}

impl TransferEvent {
    /// The transfer this event belongs to.
    pub fn name(&self) -> &str {
        match self {
            TransferEvent::Progress { name, .. }
            | TransferEvent::Complete { name, .. }
            | TransferEvent::Error { name, .. } => name,
        }
    }

    /// Whether this event ends the transfer's stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferEvent::Progress { .. })
    }
}
