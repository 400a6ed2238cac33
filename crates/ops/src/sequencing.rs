//! Resume signal, bulk uninstall and artifact housekeeping

use distro_errors::Error;
use distro_install::SweepReport;
use distro_types::TargetId;

use crate::context::Orchestrator;
use crate::types::{InstallQueue, ResumeReport, UninstallReport};

impl Orchestrator {
    /// The foreground resumed
    ///
    /// Acknowledges the pending install prompt (starting the next one),
    /// issues the next queued removal and sweeps stale artifacts that the
    /// install queue no longer references, in that order.
    pub async fn on_resume(&self) -> ResumeReport {
        let mut installs = self.shared.installs.lock().await;
        let ack = installs.acknowledge().await;
        let uninstall = self.uninstalls.lock().await.advance().await;
        let sweep = self.sweeper.sweep_stale(&installs.protected_files()).await;
        drop(installs);

        ResumeReport {
            released: ack.released,
            deferred_delete: ack.deferred_delete,
            next_install: ack.next,
            uninstall,
            sweep,
        }
    }

    /// Queue removal of every target in `ids` that has an install identifier
    /// and request the first one right away
    ///
    /// Replaces any removals still queued.
    ///
    /// # Errors
    ///
    /// Returns the uninstall primitive's error for the first request; the
    /// rest of the queue is kept for later resume signals.
    pub async fn submit_uninstall(&self, ids: &[TargetId]) -> Result<UninstallReport, Error> {
        let targets: Vec<_> = ids.iter().filter_map(|&id| self.shared.store.get(id)).collect();
        let unknown = ids.len() - targets.len();

        let mut uninstalls = self.uninstalls.lock().await;
        let plan = uninstalls.enqueue_batch(&targets);
        let requested = uninstalls.advance().await?;

        Ok(UninstallReport {
            queued: plan.queued,
            skipped: plan.skipped + unknown,
            requested,
        })
    }

    #[must_use]
    pub async fn install_queue(&self) -> InstallQueue {
        let installs = self.shared.installs.lock().await;
        InstallQueue {
            installing: installs.installing().map(Into::into),
            queued: installs.queued().map(Into::into).collect(),
        }
    }

    /// Identifiers still waiting for a resume signal
    pub async fn pending_uninstalls(&self) -> Vec<String> {
        self.uninstalls
            .lock()
            .await
            .pending()
            .map(str::to_string)
            .collect()
    }

    /// Remove temporary artifacts
    ///
    /// Everything goes when no batch is running and nothing waits for
    /// installation; otherwise only stale, unreferenced files.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact directory cannot be listed.
    pub async fn clean(&self) -> Result<SweepReport, Error> {
        let current = self.current.lock().await;
        let running = current
            .as_ref()
            .is_some_and(|batch| !batch.driver.is_finished());
        let installs = self.shared.installs.lock().await;

        if running || !installs.is_idle() {
            self.sweeper.sweep_stale(&installs.protected_files()).await
        } else {
            self.sweeper.sweep_all().await
        }
    }
}
