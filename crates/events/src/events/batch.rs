use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Bulk submission events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BatchEvent {
    /// Batch accepted with its resolved items
    Started {
        batch_id: Uuid,
        /// Version token or quick-link name
        source: String,
        total: usize,
        concurrent_limit: usize,
    },

    /// Target dropped before the batch started (unresolvable URL or unknown id)
    TargetExcluded {
        target_id: i64,
        name: Option<String>,
        reason: String,
    },

    /// One item reached a terminal state
    ItemFinished {
        batch_id: Uuid,
        target_id: i64,
        name: String,
        succeeded: bool,
        reason: Option<String>,
    },

    /// Every item terminated
    Completed {
        batch_id: Uuid,
        total: usize,
        failed: usize,
        duration: Duration,
    },

    /// Batch abandoned by cancel or a newer submission
    Cancelled {
        batch_id: Uuid,
        completed: usize,
        total: usize,
    },
}
