use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Uninstall sequencer events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UninstallEvent {
    /// Removal queue replaced; `skipped` targets had no install identifier
    BatchQueued { queued: usize, skipped: usize },

    /// Removal requested from the platform
    Requested { identifier: String, remaining: usize },

    /// Platform refused the removal request
    RequestFailed {
        identifier: String,
        failure: FailureContext,
    },
}
