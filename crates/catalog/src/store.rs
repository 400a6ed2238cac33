//! Live target store

use crate::models::{CatalogDocument, ImportList};
use distro_errors::{Error, InstallError, StorageError};
use distro_types::{TargetId, TransferTarget};
use tokio::sync::watch;

/// Configuration store consumed by the orchestrator
///
/// The orchestrator only reads targets and writes extracted metadata back;
/// creating and deleting records belongs to the store's owner.
pub trait TargetStore: Send + Sync {
    fn get(&self, id: TargetId) -> Option<TransferTarget>;

    /// Replace the stored record with the same id
    ///
    /// # Errors
    ///
    /// Returns `InstallError::TargetNotFound` when no record has that id.
    fn update(&self, target: TransferTarget) -> Result<(), Error>;

    /// All targets ordered by name
    fn list(&self) -> Vec<TransferTarget>;

    /// Live view of [`TargetStore::list`]
    fn subscribe(&self) -> watch::Receiver<Vec<TransferTarget>>;
}

/// In-memory store backed by a watch channel
#[derive(Debug)]
pub struct MemoryStore {
    targets: watch::Sender<Vec<TransferTarget>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn sort_by_name(targets: &mut [TransferTarget]) {
    targets.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}

fn next_id(targets: &[TransferTarget]) -> TargetId {
    TargetId(targets.iter().map(|t| t.id.0).max().unwrap_or(0) + 1)
}

impl MemoryStore {
    #[must_use]
    pub fn new(mut targets: Vec<TransferTarget>) -> Self {
        sort_by_name(&mut targets);
        Self {
            targets: watch::Sender::new(targets),
        }
    }

    #[must_use]
    pub fn from_document(document: CatalogDocument) -> Self {
        Self::new(document.targets)
    }

    #[must_use]
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            targets: self.list(),
            ..CatalogDocument::default()
        }
    }

    /// Add a new target and return its assigned id
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DuplicateTarget` if the URL pattern is taken.
    pub fn insert(&self, mut target: TransferTarget) -> Result<TargetId, Error> {
        let mut result = Ok(target.id);
        self.targets.send_modify(|targets| {
            if targets.iter().any(|t| t.url_pattern == target.url_pattern) {
                result = Err(StorageError::DuplicateTarget {
                    url_pattern: target.url_pattern.clone(),
                }
                .into());
                return;
            }
            if target.id.0 <= 0 || targets.iter().any(|t| t.id == target.id) {
                target.id = next_id(targets);
            }
            result = Ok(target.id);
            targets.push(target.clone());
            sort_by_name(targets);
        });
        result
    }

    /// Merge an import document, keyed by URL pattern
    ///
    /// Known URL patterns get the imported name, package name and quick
    /// links; their ids and extracted metadata are kept. Returns the number
    /// of items applied.
    pub fn import(&self, list: ImportList) -> usize {
        let count = list.apps.len();
        self.targets.send_modify(|targets| {
            for item in list.apps {
                if let Some(existing) = targets
                    .iter_mut()
                    .find(|t| t.url_pattern == item.url_pattern)
                {
                    existing.name = item.name;
                    if item.package_name.is_some() {
                        existing.install_identifier = item.package_name;
                    }
                    existing.quick_links = item.quick_links;
                } else {
                    let mut target = item.into_target();
                    target.id = next_id(targets);
                    targets.push(target);
                }
            }
            sort_by_name(targets);
        });
        tracing::debug!(count, "imported targets");
        count
    }

    #[must_use]
    pub fn export(&self) -> ImportList {
        ImportList::from_targets(self.targets.borrow().iter())
    }
}

impl TargetStore for MemoryStore {
    fn get(&self, id: TargetId) -> Option<TransferTarget> {
        self.targets.borrow().iter().find(|t| t.id == id).cloned()
    }

    fn update(&self, target: TransferTarget) -> Result<(), Error> {
        let id = target.id;
        let mut slot = Some(target);
        let found = self.targets.send_if_modified(|targets| {
            let Some(existing) = targets.iter_mut().find(|t| t.id == id) else {
                return false;
            };
            if let Some(target) = slot.take() {
                *existing = target;
            }
            sort_by_name(targets);
            true
        });

        if found {
            Ok(())
        } else {
            Err(InstallError::TargetNotFound { id: id.0 }.into())
        }
    }

    fn list(&self) -> Vec<TransferTarget> {
        self.targets.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Vec<TransferTarget>> {
        self.targets.subscribe()
    }
}
