//! Platform collaborators for the transfer orchestrator.
//!
//! This crate provides the seams between the orchestrator and the device:
//! - Package inspection (metadata extraction from a downloaded artifact)
//! - Install and uninstall requests (fire-and-forget platform prompts)
//! - Command templating shared by both

pub mod inspector;
pub mod installer;
pub mod process;

pub use inspector::{BadgingInspector, NoopInspector, PackageInspector};
pub use installer::{CommandInstaller, PackageInstaller};
pub use process::{CommandTemplate, PlatformCommand};

use distro_config::InstallConfig;
use std::sync::Arc;

/// Build the inspector described by the `[install]` section
#[must_use]
pub fn inspector_from_config(config: &InstallConfig) -> Arc<dyn PackageInspector> {
    match &config.inspect_command {
        Some(argv) => Arc::new(BadgingInspector::new(CommandTemplate::new(argv.clone()))),
        None => Arc::new(NoopInspector),
    }
}
