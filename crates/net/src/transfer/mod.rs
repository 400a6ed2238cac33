//! Single-artifact transfer

mod engine;
mod throttle;

pub use engine::{TransferEngine, TransferJob, TransferSettings};
pub use throttle::ProgressThrottle;
