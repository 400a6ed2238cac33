//! Per-batch concurrency cap

use crate::limits::{IntoResourceLimits, ResourceLimits};
use crate::semaphore::{acquire_semaphore_permit, create_semaphore};
use distro_errors::Error;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Owns the download semaphore of one batch
///
/// A fresh manager is created for every submission so that a cancelled
/// batch can never hand its permits to the next one.
#[derive(Debug)]
pub struct ResourceManager {
    limits: ResourceLimits,
    downloads: Arc<Semaphore>,
}

impl ResourceManager {
    #[must_use]
    pub fn new(limits: impl IntoResourceLimits) -> Self {
        let limits = limits.into_resource_limits();
        Self {
            downloads: create_semaphore(limits.concurrent_downloads),
            limits,
        }
    }

    #[must_use]
    pub fn limits(&self) -> ResourceLimits {
        self.limits
    }

    /// Wait for a download slot
    ///
    /// # Errors
    ///
    /// Returns `InstallError::ConcurrencyError` if the semaphore was closed.
    pub async fn acquire_download_permit(&self) -> Result<OwnedSemaphorePermit, Error> {
        acquire_semaphore_permit(self.downloads.clone(), "download").await
    }

    /// Download slots nobody holds right now
    #[must_use]
    pub fn available(&self) -> usize {
        self.downloads.available_permits()
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(ResourceLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn never_exceeds_cap() {
        let manager = Arc::new(ResourceManager::new(3usize));
        let live = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..12 {
            let manager = manager.clone();
            let live = live.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                let _permit = manager.acquire_download_permit().await.unwrap();
                let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                live.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(manager.available(), 3);
    }

    #[tokio::test]
    async fn held_permits_reduce_availability() {
        let manager = ResourceManager::new(2usize);
        let _held = manager.acquire_download_permit().await.unwrap();
        assert_eq!(manager.available(), 1);
    }
}
