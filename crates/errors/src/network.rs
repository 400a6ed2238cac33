//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The body stopped arriving mid-transfer
    #[error("no data from {url} for {waited_ms}ms")]
    Stalled { url: String, waited_ms: u64 },

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("http status {status}")]
    HttpError { status: u16, message: String },

    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl NetworkError {
    /// Classify a transport error from reqwest.
    #[must_use]
    pub fn from_transport(url: &str, is_timeout: bool, is_connect: bool, message: String) -> Self {
        if is_timeout {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if is_connect {
            Self::ConnectionRefused(message)
        } else {
            Self::DownloadFailed(message)
        }
    }
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::Stalled { .. } | Self::ConnectionRefused(_) => {
                Some("Check your network connection and that the source server is reachable.")
            }
            Self::InvalidUrl(_) => Some("Fix the download URL pattern of the target."),
            Self::HttpError { status: 404, .. } => {
                Some("The requested version does not exist on the server.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. }
            | Self::Stalled { .. }
            | Self::ConnectionRefused(_)
            | Self::DownloadFailed(_) => true,
            Self::HttpError { status, .. } => *status >= 500,
            Self::InvalidUrl(_) | Self::ClientInit(_) => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Timeout { .. } => "network.timeout",
            Self::Stalled { .. } => "network.stalled",
            Self::DownloadFailed(_) => "network.download_failed",
            Self::ConnectionRefused(_) => "network.connection_refused",
            Self::InvalidUrl(_) => "network.invalid_url",
            Self::HttpError { .. } => "network.http_error",
            Self::ClientInit(_) => "network.client_init",
        })
    }
}
