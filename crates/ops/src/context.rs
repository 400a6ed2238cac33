//! Orchestrator assembly

use distro_catalog::TargetStore;
use distro_config::Config;
use distro_errors::{Error, OpsError};
use distro_events::EventSender;
use distro_install::{CleanupSweeper, InstallSequencer, UninstallSequencer};
use distro_net::{NetClient, NetConfig, TransferEngine, TransferSettings};
use distro_platform::{PackageInspector, PackageInstaller};
use distro_types::{BatchId, BatchState, ItemState, MergeOutcome, TargetId};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// State touched by batch workers
///
/// `state` is the only structure written by concurrent transfers; every
/// write is a whole-value read-modify-write through the watch sender.
pub(crate) struct Shared {
    pub store: Arc<dyn TargetStore>,
    pub engine: TransferEngine,
    pub state: watch::Sender<BatchState>,
    pub installs: Mutex<InstallSequencer>,
}

impl Shared {
    pub fn merge(&self, batch_id: BatchId, id: TargetId, next: ItemState) -> MergeOutcome {
        let mut outcome = MergeOutcome::Ignored;
        self.state.send_if_modified(|state| {
            outcome = state.merge(batch_id, id, next);
            outcome != MergeOutcome::Ignored
        });
        outcome
    }
}

pub(crate) struct RunningBatch {
    pub batch_id: BatchId,
    pub token: CancellationToken,
    pub driver: JoinHandle<()>,
}

/// Bulk transfer and installation orchestrator
///
/// At most one batch runs at a time; submitting a new one supersedes the
/// previous. Cheap to share behind an `Arc`: every operation takes `&self`.
pub struct Orchestrator {
    pub(crate) shared: Arc<Shared>,
    pub(crate) uninstalls: Mutex<UninstallSequencer>,
    pub(crate) sweeper: CleanupSweeper,
    pub(crate) config: Config,
    pub(crate) current: Mutex<Option<RunningBatch>>,
    pub(crate) tx: EventSender,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("engine", &self.shared.engine)
            .field("sweeper", &self.sweeper)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    // No public constructor - use OrchestratorBuilder instead

    /// Live batch state for UI binding
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BatchState> {
        self.shared.state.subscribe()
    }

    /// Snapshot of the current batch state
    #[must_use]
    pub fn state(&self) -> BatchState {
        self.shared.state.borrow().clone()
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn TargetStore> {
        &self.shared.store
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hide success banners once a batch has finished
    pub fn clear_success_messages(&self) {
        self.shared.state.send_if_modified(|state| {
            if state.is_active || state.completed_at.is_none() {
                return false;
            }
            state.clear_success_messages();
            true
        });
    }
}

/// Builder for the orchestrator
pub struct OrchestratorBuilder {
    store: Option<Arc<dyn TargetStore>>,
    installer: Option<Arc<dyn PackageInstaller>>,
    inspector: Option<Arc<dyn PackageInspector>>,
    net: Option<NetClient>,
    tx: Option<EventSender>,
    config: Option<Config>,
}

impl OrchestratorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: None,
            installer: None,
            inspector: None,
            net: None,
            tx: None,
            config: None,
        }
    }

    /// Set the configuration store targets are read from
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn TargetStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the install/uninstall primitive
    #[must_use]
    pub fn with_installer(mut self, installer: Arc<dyn PackageInstaller>) -> Self {
        self.installer = Some(installer);
        self
    }

    /// Set the package inspector; defaults to the one described by `[install]`
    #[must_use]
    pub fn with_inspector(mut self, inspector: Arc<dyn PackageInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    /// Set the network client; defaults to one built from `[network]`
    #[must_use]
    pub fn with_net(mut self, net: NetClient) -> Self {
        self.net = Some(net);
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if a required component is missing, the
    /// configuration is invalid or the HTTP client cannot be created.
    pub fn build(self) -> Result<Orchestrator, Error> {
        let store = self.store.ok_or_else(|| OpsError::MissingComponent {
            component: "store".to_string(),
        })?;

        let installer = self.installer.ok_or_else(|| OpsError::MissingComponent {
            component: "installer".to_string(),
        })?;

        let tx = self.tx.ok_or_else(|| OpsError::MissingComponent {
            component: "event_sender".to_string(),
        })?;

        let config = self.config.ok_or_else(|| OpsError::MissingComponent {
            component: "config".to_string(),
        })?;
        config.validate()?;

        let net = match self.net {
            Some(net) => net,
            None => NetClient::new(NetConfig::from(&config.network))?,
        };
        let inspector = self
            .inspector
            .unwrap_or_else(|| distro_platform::inspector_from_config(&config.install));

        let engine = TransferEngine::new(
            net,
            TransferSettings::from_config(&config.transfer, &config.network),
            inspector,
        );
        let sweeper =
            CleanupSweeper::new(config.temp_dir(), &config.cleanup).with_event_sender(tx.clone());
        let installs =
            InstallSequencer::new(installer.clone(), sweeper.clone()).with_event_sender(tx.clone());
        let uninstalls = UninstallSequencer::new(installer).with_event_sender(tx.clone());
        let (state, _) = watch::channel(BatchState::default());

        Ok(Orchestrator {
            shared: Arc::new(Shared {
                store,
                engine,
                state,
                installs: Mutex::new(installs),
            }),
            uninstalls: Mutex::new(uninstalls),
            sweeper,
            config,
            current: Mutex::new(None),
            tx,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
