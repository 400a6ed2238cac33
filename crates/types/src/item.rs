//! Per-artifact transfer state machine

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::PackageMetadata;

/// Progress of a running transfer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Progress {
    /// Total size known; `fraction` is in `0.0..=1.0`
    Determinate { fraction: f32, bytes_so_far: u64 },
    /// Total size unknown; only raw bytes are reported
    Indeterminate { bytes_so_far: u64 },
}

impl Progress {
    #[must_use]
    pub fn bytes_so_far(&self) -> u64 {
        match self {
            Self::Determinate { bytes_so_far, .. } | Self::Indeterminate { bytes_so_far } => {
                *bytes_so_far
            }
        }
    }

    /// Fraction complete, `None` in indeterminate mode
    #[must_use]
    pub fn fraction(&self) -> Option<f32> {
        match self {
            Self::Determinate { fraction, .. } => Some(*fraction),
            Self::Indeterminate { .. } => None,
        }
    }

    #[must_use]
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::Indeterminate { .. })
    }
}

/// State of one item in a batch
///
/// Transitions are monotonic: once `Succeeded` or `Failed` is reached the
/// state is never revisited (see [`ItemState::can_transition_to`]).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ItemState {
    #[default]
    Idle,
    Downloading(Progress),
    Succeeded {
        local_file: PathBuf,
        metadata: Option<PackageMetadata>,
    },
    Failed {
        reason: String,
    },
}

impl ItemState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    #[must_use]
    pub fn can_transition_to(&self, next: &ItemState) -> bool {
        match self {
            Self::Succeeded { .. } | Self::Failed { .. } => false,
            Self::Idle | Self::Downloading(_) => !matches!(next, Self::Idle),
        }
    }

    /// Failure state with a message, never empty
    pub fn failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::Failed {
            reason: if reason.trim().is_empty() {
                "unknown error".to_string()
            } else {
                reason
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_final() {
        let done = ItemState::failed("boom");
        assert!(!done.can_transition_to(&ItemState::Downloading(Progress::Indeterminate {
            bytes_so_far: 1
        })));
        assert!(!done.can_transition_to(&ItemState::failed("again")));
    }

    #[test]
    fn downloading_cannot_go_back_to_idle() {
        let running = ItemState::Downloading(Progress::Determinate {
            fraction: 0.5,
            bytes_so_far: 10,
        });
        assert!(!running.can_transition_to(&ItemState::Idle));
        assert!(running.can_transition_to(&ItemState::failed("x")));
    }

    #[test]
    fn empty_failure_reason_is_replaced() {
        assert_eq!(
            ItemState::failed(""),
            ItemState::Failed {
                reason: "unknown error".into()
            }
        );
    }
}
