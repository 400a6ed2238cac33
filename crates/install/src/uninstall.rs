//! Serialized removal requests

use distro_errors::Error;
use distro_events::{AppEvent, EventEmitter, EventSender, FailureContext, UninstallEvent};
use distro_platform::PackageInstaller;
use distro_types::TransferTarget;
use std::collections::VecDeque;
use std::sync::Arc;

/// Counts reported by [`UninstallSequencer::enqueue_batch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UninstallPlan {
    pub queued: usize,
    /// Targets without an install identifier
    pub skipped: usize,
}

/// FIFO of install identifiers
///
/// Requests are fire-once: each advance issues the next removal whether or
/// not the previous one completed.
pub struct UninstallSequencer {
    queue: VecDeque<String>,
    installer: Arc<dyn PackageInstaller>,
    tx: Option<EventSender>,
}

impl EventEmitter for UninstallSequencer {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl std::fmt::Debug for UninstallSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UninstallSequencer")
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl UninstallSequencer {
    #[must_use]
    pub fn new(installer: Arc<dyn PackageInstaller>) -> Self {
        Self {
            queue: VecDeque::new(),
            installer,
            tx: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Replace the queue with the identifiers of `targets`
    pub fn enqueue_batch<'a>(
        &mut self,
        targets: impl IntoIterator<Item = &'a TransferTarget>,
    ) -> UninstallPlan {
        self.queue.clear();
        let mut skipped = 0;
        for target in targets {
            match target.resolvable_identifier() {
                Some(identifier) => self.queue.push_back(identifier.to_string()),
                None => skipped += 1,
            }
        }

        let plan = UninstallPlan {
            queued: self.queue.len(),
            skipped,
        };
        self.emit(AppEvent::Uninstall(UninstallEvent::BatchQueued {
            queued: plan.queued,
            skipped: plan.skipped,
        }));
        plan
    }

    /// Issue the next removal, if any
    ///
    /// # Errors
    ///
    /// Returns the uninstall primitive's error; the identifier is consumed
    /// either way.
    pub async fn advance(&mut self) -> Result<Option<String>, Error> {
        let Some(identifier) = self.queue.pop_front() else {
            return Ok(None);
        };

        match self.installer.request_uninstall(&identifier).await {
            Ok(()) => {
                self.emit(AppEvent::Uninstall(UninstallEvent::Requested {
                    identifier: identifier.clone(),
                    remaining: self.queue.len(),
                }));
                Ok(Some(identifier))
            }
            Err(e) => {
                self.emit(AppEvent::Uninstall(UninstallEvent::RequestFailed {
                    identifier,
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        removals: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PackageInstaller for Recorder {
        async fn request_install(&self, _file: &Path) -> Result<(), Error> {
            Ok(())
        }

        async fn request_uninstall(&self, identifier: &str) -> Result<(), Error> {
            self.removals.lock().unwrap().push(identifier.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn skips_targets_without_identifier() {
        let recorder = Arc::new(Recorder::default());
        let mut seq = UninstallSequencer::new(recorder.clone());
        let targets = [
            TransferTarget::new(1, "a", "u1").with_install_identifier("com.a"),
            TransferTarget::new(2, "b", "u2"),
            TransferTarget::new(3, "c", "u3").with_install_identifier(" "),
            TransferTarget::new(4, "d", "u4").with_install_identifier("com.d"),
        ];

        let plan = seq.enqueue_batch(&targets);
        assert_eq!(plan, UninstallPlan { queued: 2, skipped: 2 });

        assert_eq!(seq.advance().await.unwrap().as_deref(), Some("com.a"));
        assert_eq!(seq.advance().await.unwrap().as_deref(), Some("com.d"));
        assert_eq!(seq.advance().await.unwrap(), None);
        assert_eq!(*recorder.removals.lock().unwrap(), ["com.a", "com.d"]);
    }

    #[tokio::test]
    async fn new_batch_replaces_queue() {
        let mut seq = UninstallSequencer::new(Arc::new(Recorder::default()));
        seq.enqueue_batch(&[TransferTarget::new(1, "a", "u1").with_install_identifier("com.a")]);
        seq.enqueue_batch(&[TransferTarget::new(2, "b", "u2").with_install_identifier("com.b")]);
        assert_eq!(seq.pending().collect::<Vec<_>>(), ["com.b"]);
    }
}
