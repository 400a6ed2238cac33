#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Install sequencing for distro
//!
//! Downloaded artifacts reach the device through platform prompts that must
//! never overlap. This crate serializes them:
//! - [`InstallSequencer`]: FIFO of artifacts with at most one prompt pending
//! - [`UninstallSequencer`]: FIFO of install identifiers, one request per advance
//! - [`CleanupSweeper`]: removal of temporary artifacts that nothing protects

mod cleanup;
mod sequencer;
mod uninstall;

pub use cleanup::{CleanupSweeper, SweepReport};
pub use sequencer::{Acknowledgement, InstallSequencer};
pub use uninstall::{UninstallPlan, UninstallSequencer};
