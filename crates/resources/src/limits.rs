//! Per-batch concurrency limits

use distro_config::TransferConfig;
use serde::{Deserialize, Serialize};

/// Resource limit configuration for one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Maximum number of concurrent downloads, always at least one
    pub concurrent_downloads: usize,
}

impl ResourceLimits {
    /// Limits with an explicit download cap; zero is raised to one
    #[must_use]
    pub fn new(concurrent_downloads: usize) -> Self {
        Self {
            concurrent_downloads: concurrent_downloads.max(1),
        }
    }

    /// Limits for a batch resolved from a version token
    #[must_use]
    pub fn for_versions(config: &TransferConfig) -> Self {
        Self::new(config.max_concurrent)
    }

    /// Limits for a batch resolved from a quick-link name
    #[must_use]
    pub fn for_quick_links(config: &TransferConfig) -> Self {
        Self::new(config.quick_link_max_concurrent)
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self::for_versions(&TransferConfig::default())
    }
}

/// Conversion into [`ResourceLimits`]
pub trait IntoResourceLimits {
    fn into_resource_limits(self) -> ResourceLimits;
}

impl IntoResourceLimits for usize {
    fn into_resource_limits(self) -> ResourceLimits {
        ResourceLimits::new(self)
    }
}

impl IntoResourceLimits for ResourceLimits {
    fn into_resource_limits(self) -> ResourceLimits {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_kinds_use_their_own_caps() {
        let config = TransferConfig::default();
        assert_eq!(ResourceLimits::for_versions(&config).concurrent_downloads, 10);
        assert_eq!(ResourceLimits::for_quick_links(&config).concurrent_downloads, 5);
    }

    #[test]
    fn zero_is_raised_to_one() {
        assert_eq!(0usize.into_resource_limits().concurrent_downloads, 1);
    }
}
