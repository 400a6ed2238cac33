#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Bulk transfer and installation orchestration for distro
//!
//! This crate is the coordination layer between a front-end and the
//! specialized crates. An [`Orchestrator`] downloads a batch of targets
//! under a concurrency cap, merges every item transition into one live
//! [`BatchState`](distro_types::BatchState), hands finished artifacts to the
//! install sequencer and reacts to the caller's resume signal.

mod batch;
mod context;
mod resolve;
mod sequencing;
mod types;

pub use context::{Orchestrator, OrchestratorBuilder};
pub use resolve::{Exclusion, ExclusionReason};
pub use types::{BatchHandle, InstallQueue, ResumeReport, UninstallReport};
