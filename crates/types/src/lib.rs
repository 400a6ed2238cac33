#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for distro
//!
//! This crate provides the data model shared by the transfer engine, the
//! sequencers and the bulk orchestrator: configured targets, per-item
//! transfer states and the aggregate batch state bound by the UI.

pub mod batch;
pub mod item;
pub mod target;

// Re-export commonly used types
pub use batch::{BatchId, BatchItem, BatchSource, BatchState, MergeOutcome};
pub use item::{ItemState, Progress};
pub use target::{PackageMetadata, QuickLink, TargetId, TransferTarget, PLACEHOLDER_NAME};
pub use uuid::Uuid;
