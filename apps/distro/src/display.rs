//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use distro_ops::{InstallQueue, UninstallReport};
use distro_types::{BatchState, ItemState, Progress, TransferTarget};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Result of one CLI command, rendered as a table or JSON
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Final state of a download batch and what still waits for install
    Batch {
        state: BatchState,
        pending_installs: InstallQueue,
    },
    Uninstall(UninstallReport),
    Targets(Vec<TransferTarget>),
    Imported { count: usize },
    Exported { path: PathBuf, count: usize },
    Cleaned { removed: usize, protected: usize },
}

impl OperationResult {
    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    json_output: bool,
    colors: bool,
}

impl OutputRenderer {
    pub fn new(json_output: bool, colors: bool) -> Self {
        Self {
            json_output,
            colors,
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            let json = result.to_json().map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            OperationResult::Batch {
                state,
                pending_installs,
            } => self.render_batch(state, pending_installs),
            OperationResult::Uninstall(report) => {
                println!(
                    "{} removal(s) queued, {} skipped",
                    report.queued, report.skipped
                );
            }
            OperationResult::Targets(targets) => self.render_targets(targets),
            OperationResult::Imported { count } => println!("Imported {count} target(s)."),
            OperationResult::Exported { path, count } => {
                println!("Exported {count} target(s) to {}", path.display());
            }
            OperationResult::Cleaned { removed, protected } => {
                println!("Removed {removed} artifact(s), kept {protected} still queued for install.");
            }
        }
        Ok(())
    }

    fn render_batch(&self, state: &BatchState, pending: &InstallQueue) {
        if state.total == 0 {
            println!("Nothing to download.");
            return;
        }

        let mut table = self.table();
        table.set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Target").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);
        for item in state.ordered_items() {
            table.add_row(vec![
                Cell::new(item.target.id),
                Cell::new(item.target.display_name()),
                self.status_cell(&item.state),
            ]);
        }
        println!("{table}");

        let summary = format!(
            "{}/{} completed, {} failed",
            state.completed, state.total, state.failed
        );
        println!("{summary}");
        if !pending.is_empty() {
            println!(
                "{} artifact(s) still waiting for install.",
                pending.queued.len() + usize::from(pending.installing.is_some())
            );
        }
    }

    fn render_targets(&self, targets: &[TransferTarget]) {
        if targets.is_empty() {
            println!("No targets configured. Use `distro import <file>` to add some.");
            return;
        }

        let mut table = self.table();
        table.set_header(vec![
            Cell::new("Id").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Package").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("URL pattern").add_attribute(Attribute::Bold),
            Cell::new("Quick links").add_attribute(Attribute::Bold),
        ]);
        for target in targets {
            let quick_links = target
                .quick_links
                .iter()
                .map(|ql| ql.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![
                Cell::new(target.id),
                Cell::new(target.display_name()),
                Cell::new(target.install_identifier.as_deref().unwrap_or("-")),
                Cell::new(target.version_label.as_deref().unwrap_or("-")),
                Cell::new(&target.url_pattern),
                Cell::new(if quick_links.is_empty() { "-".to_string() } else { quick_links }),
            ]);
        }
        println!("{table}");
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.colors {
            table.force_no_tty();
        }
        table
    }

    fn status_cell(&self, state: &ItemState) -> Cell {
        let (text, color) = match state {
            ItemState::Idle => ("waiting".to_string(), None),
            ItemState::Downloading(Progress::Determinate { fraction, .. }) => {
                (format!("{:.0}%", fraction * 100.0), Some(Color::Yellow))
            }
            ItemState::Downloading(Progress::Indeterminate { bytes_so_far }) => {
                (format!("{bytes_so_far} bytes"), Some(Color::Yellow))
            }
            ItemState::Succeeded { .. } => ("downloaded".to_string(), Some(Color::Green)),
            ItemState::Failed { reason } => (format!("failed: {reason}"), Some(Color::Red)),
        };
        let cell = Cell::new(text);
        match color {
            Some(color) if self.colors => cell.fg(color),
            _ => cell,
        }
    }
}
