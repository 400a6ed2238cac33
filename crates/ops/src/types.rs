//! Reports returned by orchestrator operations

use distro_errors::Error;
use distro_install::SweepReport;
use distro_types::{BatchId, BatchState};
use serde::Serialize;
use std::path::PathBuf;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::resolve::Exclusion;

/// Handle to a submitted batch
#[derive(Debug)]
pub struct BatchHandle {
    pub batch_id: BatchId,
    pub total: usize,
    /// Requested targets that were left out before the batch started
    pub excluded: Vec<Exclusion>,
    state: watch::Receiver<BatchState>,
}

impl BatchHandle {
    pub(crate) fn new(
        batch_id: BatchId,
        total: usize,
        excluded: Vec<Exclusion>,
        state: watch::Receiver<BatchState>,
    ) -> Self {
        Self {
            batch_id,
            total,
            excluded,
            state,
        }
    }

    /// Live batch state
    #[must_use]
    pub fn state(&self) -> watch::Receiver<BatchState> {
        self.state.clone()
    }

    /// Wait until this batch has finished or been superseded
    ///
    /// Returns the last observed state.
    pub async fn wait(&mut self) -> BatchState {
        let batch_id = self.batch_id;
        let observed = match self
            .state
            .wait_for(|state| state.batch_id != Some(batch_id) || !state.is_active)
            .await
        {
            Ok(state) => Some(state.clone()),
            Err(_) => None,
        };
        // Orchestrator dropped: fall back to the last value it published
        observed.unwrap_or_else(|| self.state.borrow().clone())
    }
}

/// What one resume signal did
#[derive(Debug)]
pub struct ResumeReport {
    /// Artifact whose install prompt was acknowledged
    pub released: Option<PathBuf>,
    /// Deferred removal of `released`
    pub deferred_delete: Option<JoinHandle<bool>>,
    /// Next install prompt issued, if any
    pub next_install: Result<Option<PathBuf>, Error>,
    /// Removal request issued, if any
    pub uninstall: Result<Option<String>, Error>,
    pub sweep: Result<SweepReport, Error>,
}

/// Result of a bulk uninstall submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UninstallReport {
    pub queued: usize,
    /// Unknown ids and targets without an install identifier
    pub skipped: usize,
    /// Identifier whose removal was requested right away
    pub requested: Option<String>,
}

/// Snapshot of the install queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallQueue {
    pub installing: Option<PathBuf>,
    pub queued: Vec<PathBuf>,
}

impl InstallQueue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.installing.is_none() && self.queued.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use distro_types::{BatchItem, TransferTarget, Uuid};

    fn running(batch_id: BatchId) -> BatchState {
        let target = TransferTarget::new(1, "Example", "https://example.com/{version}.apk");
        let item = BatchItem {
            target,
            url: "https://example.com/1.apk".to_string(),
            state: distro_types::ItemState::Idle,
            order: 0,
        };
        BatchState::start(batch_id, vec![item])
    }

    #[tokio::test]
    async fn wait_returns_when_superseded() {
        let batch_id = Uuid::new_v4();
        let (tx, rx) = watch::channel(running(batch_id));
        let mut handle = BatchHandle::new(batch_id, 1, Vec::new(), rx);

        let waiter = tokio::spawn(async move { handle.wait().await });
        tx.send_replace(BatchState::default());

        let last = waiter.await.unwrap();
        assert_eq!(last.batch_id, None);
    }

    #[tokio::test]
    async fn wait_falls_back_to_last_state_when_orchestrator_is_gone() {
        let batch_id = Uuid::new_v4();
        let (tx, rx) = watch::channel(running(batch_id));
        let mut handle = BatchHandle::new(batch_id, 1, Vec::new(), rx);
        drop(tx);

        let last = handle.wait().await;
        assert_eq!(last.batch_id, Some(batch_id));
        assert!(last.is_active);
    }
}
