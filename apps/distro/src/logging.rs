//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields so
//! `--json` output can be consumed by log tooling.

use distro_events::{
    AppEvent, BatchEvent, CleanupEvent, DownloadEvent, EventMessage, GeneralEvent, InstallEvent,
    UninstallEvent,
};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` at its level with structured fields
#[allow(clippy::too_many_lines)]
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let source = meta.source.as_str();
    let correlation = meta.correlation_id.as_deref().unwrap_or("-");

    match &message.event {
        AppEvent::Download(event) => match event {
            DownloadEvent::Started {
                url,
                package,
                total_bytes,
            } => {
                debug!(source, correlation, url = %url, package = ?package, total_bytes = ?total_bytes, "Download started");
            }
            DownloadEvent::Completed {
                url,
                package,
                bytes_downloaded,
                elapsed_ms,
            } => {
                info!(source, correlation, url = %url, package = ?package, bytes_downloaded, elapsed_ms, "Download completed");
            }
            DownloadEvent::Failed {
                url,
                package,
                failure,
            } => {
                error!(
                    source,
                    correlation,
                    url = %url,
                    package = ?package,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Download failed"
                );
            }
        },

        AppEvent::Batch(event) => match event {
            BatchEvent::Started {
                batch_id,
                source: batch_source,
                total,
                concurrent_limit,
            } => {
                info!(source, %batch_id, batch_source = %batch_source, total, concurrent_limit, "Batch started");
            }
            BatchEvent::TargetExcluded {
                target_id,
                name,
                reason,
            } => {
                warn!(source, correlation, target_id, name = ?name, reason = %reason, "Target excluded from batch");
            }
            BatchEvent::ItemFinished {
                batch_id,
                target_id,
                name,
                succeeded,
                reason,
            } => {
                if *succeeded {
                    info!(source, %batch_id, target_id, name = %name, "Item succeeded");
                } else {
                    error!(source, %batch_id, target_id, name = %name, reason = ?reason, "Item failed");
                }
            }
            BatchEvent::Completed {
                batch_id,
                total,
                failed,
                duration,
            } => {
                info!(source, %batch_id, total, failed, duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX), "Batch completed");
            }
            BatchEvent::Cancelled {
                batch_id,
                completed,
                total,
            } => {
                warn!(source, %batch_id, completed, total, "Batch cancelled");
            }
        },

        AppEvent::Install(event) => match event {
            InstallEvent::Queued { path, queue_len } => {
                info!(source, path = %path.display(), queue_len, "Install queued");
            }
            InstallEvent::Requested { path, remaining } => {
                info!(source, path = %path.display(), remaining, "Install prompt requested");
            }
            InstallEvent::RequestFailed { path, failure } => {
                error!(
                    source,
                    path = %path.display(),
                    code = ?failure.code,
                    message = %failure.message,
                    "Install request failed"
                );
            }
            InstallEvent::Acknowledged { path } => {
                info!(source, path = %path.display(), "Install prompt acknowledged");
            }
            InstallEvent::QueueCleared { dropped } => {
                info!(source, dropped, "Install queue cleared");
            }
        },

        AppEvent::Uninstall(event) => match event {
            UninstallEvent::BatchQueued { queued, skipped } => {
                if *skipped > 0 {
                    warn!(source, queued, skipped, "Uninstall batch queued with skipped targets");
                } else {
                    info!(source, queued, "Uninstall batch queued");
                }
            }
            UninstallEvent::Requested {
                identifier,
                remaining,
            } => {
                info!(source, identifier = %identifier, remaining, "Uninstall requested");
            }
            UninstallEvent::RequestFailed {
                identifier,
                failure,
            } => {
                error!(
                    source,
                    identifier = %identifier,
                    code = ?failure.code,
                    message = %failure.message,
                    "Uninstall request failed"
                );
            }
        },

        AppEvent::Cleanup(event) => match event {
            CleanupEvent::FileDeleted { path, mode } => {
                debug!(source, path = %path.display(), mode = ?mode, "Artifact deleted");
            }
            CleanupEvent::SweepCompleted {
                mode,
                removed,
                protected,
            } => {
                info!(source, mode = ?mode, removed, protected, "Cleanup sweep completed");
            }
            CleanupEvent::SweepFailed { mode, message } => {
                warn!(source, mode = ?mode, message = %message, "Cleanup sweep failed");
            }
        },

        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message, context } => {
                warn!(source, context = ?context, "{message}");
            }
            GeneralEvent::Failed { operation, failure } => {
                error!(
                    source,
                    operation = %operation,
                    code = ?failure.code,
                    hint = ?failure.hint,
                    "{}",
                    failure.message
                );
            }
            GeneralEvent::Debug { message } => {
                debug!(source, "{message}");
            }
        },
    }
}
