#![deny(clippy::pedantic, unsafe_code)]

//! Resource management utilities for distro
//!
//! The concurrency cap of a bulk transfer is a counting semaphore owned by a
//! [`ResourceManager`]. Every transfer holds one permit for its whole
//! lifetime, so at most `concurrent_downloads` transfers are ever in flight.

pub mod limits;
pub mod manager;
pub mod semaphore;

pub use limits::{IntoResourceLimits, ResourceLimits};
pub use manager::ResourceManager;
pub use semaphore::{acquire_semaphore_permit, create_semaphore};
