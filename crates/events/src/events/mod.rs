use serde::{Deserialize, Serialize};

use crate::EventSource;
use distro_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Failure with only a message (e.g. an HTTP status line).
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            hint: None,
            retryable: false,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(Into::into),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(Into::into),
            retryable: error.is_retryable(),
        }
    }
}

pub mod batch;
pub mod cleanup;
pub mod download;
pub mod general;
pub mod install;
pub mod uninstall;

pub use batch::BatchEvent;
pub use cleanup::{CleanupEvent, SweepMode};
pub use download::DownloadEvent;
pub use general::GeneralEvent;
pub use install::InstallEvent;
pub use uninstall::UninstallEvent;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, operations)
    General(GeneralEvent),

    /// Single transfer lifecycle
    Download(DownloadEvent),

    /// Bulk submission lifecycle
    Batch(BatchEvent),

    /// Install sequencer
    Install(InstallEvent),

    /// Uninstall sequencer
    Uninstall(UninstallEvent),

    /// Temporary artifact cleanup
    Cleanup(CleanupEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::General,
            Self::Download(_) => EventSource::Download,
            Self::Batch(_) => EventSource::Batch,
            Self::Install(_) => EventSource::Install,
            Self::Uninstall(_) => EventSource::Uninstall,
            Self::Cleanup(_) => EventSource::Cleanup,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Failed { .. })
            | Self::Download(DownloadEvent::Failed { .. })
            | Self::Install(InstallEvent::RequestFailed { .. })
            | Self::Uninstall(UninstallEvent::RequestFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Batch(BatchEvent::TargetExcluded { .. })
            | Self::Uninstall(UninstallEvent::BatchQueued { skipped: 1.., .. }) => Level::WARN,

            Self::General(GeneralEvent::Debug { .. })
            | Self::Cleanup(CleanupEvent::FileDeleted { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "distro::events::general",
            Self::Download(_) => "distro::events::download",
            Self::Batch(_) => "distro::events::batch",
            Self::Install(_) => "distro::events::install",
            Self::Uninstall(_) => "distro::events::uninstall",
            Self::Cleanup(_) => "distro::events::cleanup",
        }
    }
}
