use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which cleanup pass removed a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// Resume-time sweep of old, unprotected artifacts
    Stale,
    /// Unconditional sweep after cancellation
    All,
    /// Delayed removal of an acknowledged install
    Deferred,
}

/// Temporary artifact cleanup events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CleanupEvent {
    FileDeleted { path: PathBuf, mode: SweepMode },

    SweepCompleted {
        mode: SweepMode,
        removed: usize,
        protected: usize,
    },

    SweepFailed { mode: SweepMode, message: String },
}
