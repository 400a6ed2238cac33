#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Target catalog for distro
//!
//! The catalog is the configuration store the orchestrator reads targets
//! from and writes extracted metadata back to. It is held in memory behind a
//! watch channel so front-ends see live updates, persisted as a JSON file,
//! and exchanged with other installations through a smaller import/export
//! document.

mod file;
mod models;
mod store;

pub use file::CatalogFile;
pub use models::{CatalogDocument, ImportItem, ImportList};
pub use store::{MemoryStore, TargetStore};
