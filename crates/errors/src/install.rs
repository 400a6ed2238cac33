//! Install and uninstall error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum InstallError {
    #[error("install request failed for {path}: {message}")]
    InstallRequestFailed { path: String, message: String },

    #[error("uninstall request failed for {identifier}: {message}")]
    UninstallRequestFailed { identifier: String, message: String },

    #[error("target not found: {id}")]
    TargetNotFound { id: i64 },

    #[error("concurrency error: {message}")]
    ConcurrencyError { message: String },

    #[error("command not configured: {command}")]
    CommandNotConfigured { command: String },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::InstallRequestFailed { .. } | Self::UninstallRequestFailed { .. } => {
                Some("The platform refused the request; resume to move on to the next item.")
            }
            Self::CommandNotConfigured { .. } => {
                Some("Set install_command and uninstall_command in the [install] section.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InstallRequestFailed { .. } => "install.request_failed",
            Self::UninstallRequestFailed { .. } => "install.uninstall_request_failed",
            Self::TargetNotFound { .. } => "install.target_not_found",
            Self::ConcurrencyError { .. } => "install.concurrency",
            Self::CommandNotConfigured { .. } => "install.command_not_configured",
        })
    }
}
