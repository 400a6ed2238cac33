use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Install sequencer events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstallEvent {
    /// Artifact appended to the install queue
    Queued { path: PathBuf, queue_len: usize },

    /// Install prompt requested from the platform
    Requested { path: PathBuf, remaining: usize },

    /// Platform refused the install request; the queue stays blocked until resume
    RequestFailed {
        path: PathBuf,
        failure: FailureContext,
    },

    /// Resume signal released the pending install
    Acknowledged { path: PathBuf },

    /// Queue and marker dropped (cancellation)
    QueueCleared { dropped: usize },
}
