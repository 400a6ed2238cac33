//! Event handling and status display

use console::{Style, Term};
use distro_events::{
    AppEvent, BatchEvent, CleanupEvent, DownloadEvent, EventMessage, InstallEvent, UninstallEvent,
};

use crate::logging::log_event_with_tracing;

/// Turns orchestrator events into status lines on stderr
///
/// Every event is also forwarded to tracing. In JSON mode the status lines
/// are suppressed so stdout/stderr stay machine readable.
pub struct EventHandler {
    term: Term,
    quiet: bool,
    debug: bool,
    ok: Style,
    err: Style,
    dim: Style,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, quiet: bool, debug: bool) -> Self {
        let style = |s: Style| if colors_enabled { s } else { Style::new() };
        Self {
            term: Term::stderr(),
            quiet,
            debug,
            ok: style(Style::new().green()),
            err: style(Style::new().red()),
            dim: style(Style::new().dim()),
        }
    }

    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);
        if self.quiet {
            return;
        }
        if let Some(line) = self.status_line(&message.event) {
            let _ = self.term.write_line(&line);
        }
    }

    fn status_line(&self, event: &AppEvent) -> Option<String> {
        Some(match event {
            AppEvent::Batch(BatchEvent::Started { source, total, .. }) => {
                format!("Downloading {total} target(s) ({source})")
            }
            AppEvent::Batch(BatchEvent::TargetExcluded { target_id, name, reason }) => {
                let name = name.as_deref().unwrap_or("?");
                self.dim
                    .apply_to(format!("  skipped #{target_id} {name}: {reason}"))
                    .to_string()
            }
            AppEvent::Batch(BatchEvent::ItemFinished {
                name,
                succeeded: true,
                ..
            }) => self.ok.apply_to(format!("  ✓ {name}")).to_string(),
            AppEvent::Batch(BatchEvent::ItemFinished { name, reason, .. }) => self
                .err
                .apply_to(format!(
                    "  ✗ {name}: {}",
                    reason.as_deref().unwrap_or("unknown error")
                ))
                .to_string(),
            AppEvent::Batch(BatchEvent::Completed { total, failed, .. }) => {
                if *failed > 0 {
                    self.err
                        .apply_to(format!("{total} done, {failed} failed"))
                        .to_string()
                } else {
                    self.ok.apply_to(format!("{total} done")).to_string()
                }
            }
            AppEvent::Batch(BatchEvent::Cancelled { completed, total, .. }) => {
                format!("Cancelled after {completed}/{total}")
            }
            AppEvent::Install(InstallEvent::Requested { path, remaining }) => {
                format!("Install prompt opened for {} ({remaining} waiting)", path.display())
            }
            AppEvent::Install(InstallEvent::RequestFailed { path, failure }) => self
                .err
                .apply_to(format!("Install of {} refused: {}", path.display(), failure.message))
                .to_string(),
            AppEvent::Uninstall(UninstallEvent::BatchQueued { queued, skipped }) if *skipped > 0 => {
                format!("{queued} removal(s) queued, {skipped} skipped without package name")
            }
            AppEvent::Uninstall(UninstallEvent::Requested { identifier, remaining }) => {
                format!("Removal requested for {identifier} ({remaining} waiting)")
            }
            AppEvent::Uninstall(UninstallEvent::RequestFailed { identifier, failure }) => self
                .err
                .apply_to(format!("Removal of {identifier} refused: {}", failure.message))
                .to_string(),
            AppEvent::Cleanup(CleanupEvent::SweepFailed { message, .. }) => self
                .err
                .apply_to(format!("Cleanup failed: {message}"))
                .to_string(),
            AppEvent::Download(DownloadEvent::Completed {
                package: Some(package),
                bytes_downloaded,
                ..
            }) if self.debug => self
                .dim
                .apply_to(format!("  {package}: {bytes_downloaded} bytes"))
                .to_string(),
            _ => return None,
        })
    }
}
