//! Serialized install prompts

use distro_errors::Error;
use distro_events::{AppEvent, EventEmitter, EventSender, FailureContext, InstallEvent};
use distro_platform::PackageInstaller;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::cleanup::CleanupSweeper;

/// Result of [`InstallSequencer::acknowledge`]
#[derive(Debug)]
pub struct Acknowledgement {
    /// Artifact whose prompt was dismissed
    pub released: Option<PathBuf>,
    /// Deferred removal of `released`
    pub deferred_delete: Option<JoinHandle<bool>>,
    /// Outcome of starting the next queued install
    pub next: Result<Option<PathBuf>, Error>,
}

/// FIFO of downloaded artifacts with at most one install pending
///
/// `Empty` ⇄ `Queued` → `Installing` → acknowledge → `Queued` or `Empty`.
/// Only [`acknowledge`](Self::acknowledge) clears the pending install; a
/// refused request keeps the queue blocked until then.
pub struct InstallSequencer {
    queue: VecDeque<PathBuf>,
    installing: Option<PathBuf>,
    installer: Arc<dyn PackageInstaller>,
    sweeper: CleanupSweeper,
    tx: Option<EventSender>,
}

impl EventEmitter for InstallSequencer {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl std::fmt::Debug for InstallSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallSequencer")
            .field("queue", &self.queue)
            .field("installing", &self.installing)
            .finish_non_exhaustive()
    }
}

impl InstallSequencer {
    #[must_use]
    pub fn new(installer: Arc<dyn PackageInstaller>, sweeper: CleanupSweeper) -> Self {
        Self {
            queue: VecDeque::new(),
            installing: None,
            installer,
            sweeper,
            tx: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Append `file`; starts it right away when nothing is installing
    ///
    /// # Errors
    ///
    /// Returns the install primitive's error if the immediate request fails.
    pub async fn enqueue(&mut self, file: PathBuf) -> Result<Option<PathBuf>, Error> {
        self.queue.push_back(file.clone());
        self.emit(AppEvent::Install(InstallEvent::Queued {
            path: file,
            queue_len: self.queue.len(),
        }));
        self.advance().await
    }

    /// Start the next queued install unless one is already pending
    ///
    /// Returns the file handed to the platform, or `None` when nothing
    /// happened.
    ///
    /// # Errors
    ///
    /// Returns the install primitive's error. The file stays marked as
    /// installing so the queue waits for the next acknowledgement.
    pub async fn advance(&mut self) -> Result<Option<PathBuf>, Error> {
        if self.installing.is_some() {
            return Ok(None);
        }
        let Some(file) = self.queue.pop_front() else {
            return Ok(None);
        };
        self.installing = Some(file.clone());

        match self.installer.request_install(&file).await {
            Ok(()) => {
                self.emit(AppEvent::Install(InstallEvent::Requested {
                    path: file.clone(),
                    remaining: self.queue.len(),
                }));
                Ok(Some(file))
            }
            Err(e) => {
                self.emit(AppEvent::Install(InstallEvent::RequestFailed {
                    path: file,
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    /// The pending prompt is presumed dismissed
    ///
    /// Clears the marker, schedules the deferred removal of that artifact
    /// and starts the next queued install.
    pub async fn acknowledge(&mut self) -> Acknowledgement {
        let released = self.installing.take();
        let deferred_delete = released.as_ref().map(|path| {
            self.emit(AppEvent::Install(InstallEvent::Acknowledged { path: path.clone() }));
            self.sweeper.schedule_deferred_delete(path.clone())
        });

        Acknowledgement {
            released,
            deferred_delete,
            next: self.advance().await,
        }
    }

    /// Drop the queue and the pending marker; returns how many were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len() + usize::from(self.installing.is_some());
        self.queue.clear();
        self.installing = None;
        if dropped > 0 {
            self.emit(AppEvent::Install(InstallEvent::QueueCleared { dropped }));
        }
        dropped
    }

    /// Files the age-based sweep must keep
    #[must_use]
    pub fn protected_files(&self) -> HashSet<PathBuf> {
        self.queue.iter().chain(self.installing.iter()).cloned().collect()
    }

    #[must_use]
    pub fn installing(&self) -> Option<&Path> {
        self.installing.as_deref()
    }

    /// Files waiting behind the pending install, in install order
    pub fn queued(&self) -> impl Iterator<Item = &Path> {
        self.queue.iter().map(PathBuf::as_path)
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.installing.is_none() && self.queue.is_empty()
    }
}
