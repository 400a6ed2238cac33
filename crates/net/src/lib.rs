#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for distro
//!
//! This crate owns the HTTP client and the transfer engine that streams one
//! artifact to disk while reporting throttled progress as item states.

mod client;
mod transfer;

pub use client::{NetClient, NetConfig};
pub use transfer::{ProgressThrottle, TransferEngine, TransferJob, TransferSettings};

use distro_errors::{Error, NetworkError};
use url::Url;

/// Parse and validate a URL
///
/// Only `http` and `https` URLs with a host are accepted.
///
/// # Errors
///
/// Returns `NetworkError::InvalidUrl` if the string is malformed or uses
/// another scheme.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(parsed),
        scheme => Err(NetworkError::InvalidUrl(format!("{url}: unsupported scheme {scheme}")).into()),
    }
}
