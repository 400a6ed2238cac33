//! Batch submission, execution and cancellation

use chrono::Utc;
use distro_catalog::TargetStore;
use distro_errors::Error;
use distro_events::{AppEvent, BatchEvent, CorrelatedSender, EventEmitter};
use distro_install::SweepReport;
use distro_net::TransferJob;
use distro_resources::{ResourceLimits, ResourceManager};
use distro_types::{
    BatchId, BatchSource, BatchState, ItemState, MergeOutcome, PackageMetadata, TargetId,
    TransferTarget,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::context::{Orchestrator, RunningBatch, Shared};
use crate::resolve::resolve;
use crate::types::BatchHandle;

struct BatchPlan {
    batch_id: BatchId,
    jobs: Vec<(TransferTarget, TransferJob)>,
    limits: ResourceLimits,
}

impl Orchestrator {
    /// Download every target in `ids` with `version` substituted into its
    /// URL pattern
    ///
    /// Supersedes any running batch. Targets that cannot be resolved are
    /// reported in [`BatchHandle::excluded`] and left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact directory cannot be created.
    pub async fn submit_batch(
        &self,
        ids: &[TargetId],
        version: impl Into<String>,
    ) -> Result<BatchHandle, Error> {
        self.submit(ids, BatchSource::Version(version.into())).await
    }

    /// Download every target in `ids` through its quick link called `name`
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact directory cannot be created.
    pub async fn submit_batch_by_quick_link(
        &self,
        ids: &[TargetId],
        name: impl Into<String>,
    ) -> Result<BatchHandle, Error> {
        self.submit(ids, BatchSource::QuickLink(name.into())).await
    }

    /// Stop the running batch and drop everything it produced
    ///
    /// Afterwards the batch state is empty, the install queue is clear and
    /// every temporary artifact has been removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact directory cannot be listed; the
    /// batch and install queue are reset regardless.
    pub async fn cancel(&self) -> Result<SweepReport, Error> {
        let mut current = self.current.lock().await;
        self.abort(&mut current).await;
        self.reset().await
    }

    async fn submit(&self, ids: &[TargetId], source: BatchSource) -> Result<BatchHandle, Error> {
        let mut current = self.current.lock().await;
        self.abort(&mut current).await;
        if let Err(e) = self.reset().await {
            warn!(error = %e, "cleanup before new batch failed");
            self.tx.emit_failure("cleanup before new batch", &e);
        }
        self.sweeper.prepare().await?;

        let resolution = resolve(self.shared.store.as_ref(), ids, &source);
        let batch_id = Uuid::new_v4();
        let events = CorrelatedSender::new(self.tx.clone(), batch_id.to_string());

        for exclusion in &resolution.excluded {
            events.emit(AppEvent::Batch(BatchEvent::TargetExcluded {
                target_id: exclusion.target_id.0,
                name: exclusion.name.clone(),
                reason: exclusion.reason.to_string(),
            }));
        }

        let limits = match &source {
            BatchSource::Version(_) => ResourceLimits::for_versions(&self.config.transfer),
            BatchSource::QuickLink(_) => ResourceLimits::for_quick_links(&self.config.transfer),
        };
        let jobs: Vec<_> = resolution
            .items
            .iter()
            .map(|item| {
                let job = TransferJob {
                    url: item.url.clone(),
                    dest: self.sweeper.allocate(),
                    label: Some(item.target.display_name()),
                };
                (item.target.clone(), job)
            })
            .collect();
        let total = jobs.len();

        self.shared
            .state
            .send_replace(BatchState::start(batch_id, resolution.items));
        events.emit(AppEvent::Batch(BatchEvent::Started {
            batch_id,
            source: source.label().to_string(),
            total,
            concurrent_limit: limits.concurrent_downloads,
        }));

        let handle = BatchHandle::new(batch_id, total, resolution.excluded, self.subscribe());
        if total == 0 {
            events.emit(AppEvent::Batch(BatchEvent::Completed {
                batch_id,
                total: 0,
                failed: 0,
                duration: Duration::ZERO,
            }));
            return Ok(handle);
        }

        let token = CancellationToken::new();
        let plan = BatchPlan {
            batch_id,
            jobs,
            limits,
        };
        let driver = tokio::spawn(drive(self.shared.clone(), plan, events, token.clone()));
        *current = Some(RunningBatch {
            batch_id,
            token,
            driver,
        });
        Ok(handle)
    }

    /// Cancel the running batch and wait for its workers to stop
    async fn abort(&self, current: &mut Option<RunningBatch>) {
        let Some(running) = current.take() else {
            return;
        };
        running.token.cancel();
        if let Err(e) = running.driver.await {
            warn!(batch_id = %running.batch_id, error = %e, "batch driver ended abnormally");
        }

        let (active, completed, total) = {
            let state = self.shared.state.borrow();
            (
                state.batch_id == Some(running.batch_id) && state.is_active,
                state.completed,
                state.total,
            )
        };
        if active {
            CorrelatedSender::new(self.tx.clone(), running.batch_id.to_string()).emit(
                AppEvent::Batch(BatchEvent::Cancelled {
                    batch_id: running.batch_id,
                    completed,
                    total,
                }),
            );
        }
    }

    async fn reset(&self) -> Result<SweepReport, Error> {
        self.shared.state.send_replace(BatchState::default());
        self.shared.installs.lock().await.clear();
        self.sweeper.sweep_all().await
    }
}

async fn drive(
    shared: Arc<Shared>,
    plan: BatchPlan,
    events: CorrelatedSender,
    token: CancellationToken,
) {
    let started = Instant::now();
    let batch_id = plan.batch_id;
    let resources = Arc::new(ResourceManager::new(plan.limits));
    debug!(%batch_id, items = plan.jobs.len(), slots = resources.available(), "batch driver started");

    let mut tasks = JoinSet::new();
    for (target, job) in plan.jobs {
        tasks.spawn(run_item(
            shared.clone(),
            resources.clone(),
            batch_id,
            target,
            job,
            events.clone(),
            token.clone(),
        ));
    }
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!(%batch_id, error = %e, "transfer task ended abnormally");
        }
    }

    if token.is_cancelled() {
        return;
    }

    let mut summary = None;
    shared.state.send_if_modified(|state| {
        let finished = state.finish(batch_id, Utc::now());
        if finished {
            summary = Some((state.total, state.failed));
        }
        finished
    });
    match summary {
        Some((total, failed)) => events.emit(AppEvent::Batch(BatchEvent::Completed {
            batch_id,
            total,
            failed,
            duration: started.elapsed(),
        })),
        None => warn!(%batch_id, "batch ended with items still running"),
    }
}

async fn run_item(
    shared: Arc<Shared>,
    resources: Arc<ResourceManager>,
    batch_id: BatchId,
    target: TransferTarget,
    job: TransferJob,
    events: CorrelatedSender,
    token: CancellationToken,
) {
    let id = target.id;
    let permit = tokio::select! {
        () = token.cancelled() => return,
        permit = resources.acquire_download_permit() => permit,
    };
    let _permit = match permit {
        Ok(permit) => permit,
        Err(e) => {
            settle(&shared, batch_id, &target, ItemState::failed(e.reason()), &events).await;
            return;
        }
    };

    let terminal = tokio::select! {
        biased;
        () = token.cancelled() => return,
        state = shared.engine.run(&job, &events, |next| {
            if !next.is_terminal() {
                shared.merge(batch_id, id, next);
            }
        }) => state,
    };

    if token.is_cancelled() {
        return;
    }
    settle(&shared, batch_id, &target, terminal, &events).await;
}

/// Record a terminal state and hand successes to the install queue
async fn settle(
    shared: &Shared,
    batch_id: BatchId,
    target: &TransferTarget,
    terminal: ItemState,
    events: &CorrelatedSender,
) {
    let outcome = shared.merge(batch_id, target.id, terminal.clone());
    match (outcome, terminal) {
        (MergeOutcome::Succeeded, ItemState::Succeeded { local_file, metadata }) => {
            events.emit(AppEvent::Batch(BatchEvent::ItemFinished {
                batch_id,
                target_id: target.id.0,
                name: target.display_name(),
                succeeded: true,
                reason: None,
            }));
            if let Some(metadata) = metadata {
                write_back(shared.store.as_ref(), target.id, &metadata, events);
            }

            let mut installs = shared.installs.lock().await;
            if let Err(e) = installs.enqueue(local_file).await {
                debug!(target_id = %target.id, error = %e, "install request refused");
            }
        }
        (MergeOutcome::Failed, ItemState::Failed { reason }) => {
            events.emit(AppEvent::Batch(BatchEvent::ItemFinished {
                batch_id,
                target_id: target.id.0,
                name: target.display_name(),
                succeeded: false,
                reason: Some(reason),
            }));
        }
        _ => {}
    }
}

/// Store freshly extracted metadata on the target; failures are only logged
fn write_back(
    store: &dyn TargetStore,
    id: TargetId,
    metadata: &PackageMetadata,
    events: &CorrelatedSender,
) {
    let Some(updated) = store
        .get(id)
        .and_then(|current| current.with_metadata(metadata))
    else {
        return;
    };
    match store.update(updated) {
        Ok(()) => debug!(target_id = %id, "cached package metadata updated"),
        Err(e) => {
            warn!(target_id = %id, error = %e, "metadata write-back failed");
            events.emit_warning(format!("could not store metadata for target {id}: {}", e.reason()));
        }
    }
}
