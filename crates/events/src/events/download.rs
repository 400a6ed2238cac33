use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Single transfer events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DownloadEvent {
    /// Response headers received; `total_bytes` is `None` in indeterminate mode
    Started {
        url: String,
        package: Option<String>,
        total_bytes: Option<u64>,
    },

    /// Stream closed and the artifact is on disk
    Completed {
        url: String,
        package: Option<String>,
        bytes_downloaded: u64,
        elapsed_ms: u64,
    },

    /// Transfer ended in failure
    Failed {
        url: String,
        package: Option<String>,
        failure: FailureContext,
    },
}
