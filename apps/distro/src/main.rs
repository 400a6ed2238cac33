//! distro - bulk package download and install orchestrator
//!
//! Main CLI application. Downloads run through the ops crate; this binary
//! owns configuration precedence, the persisted catalog, tracing setup and
//! the interactive resume loop that walks the install queue.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod setup;

use crate::cli::{Cli, Commands, ResumeArgs};
use crate::display::{OperationResult, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use crate::setup::Catalog;
use clap::Parser;
use distro_catalog::{ImportList, TargetStore};
use distro_errors::OpsError;
use distro_events::EventReceiver;
use distro_ops::{BatchHandle, Orchestrator, OrchestratorBuilder};
use distro_platform::CommandInstaller;
use distro_types::TargetId;
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::select;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting distro v{}", env!("CARGO_PKG_VERSION"));

    let config = setup::load_config(&cli.global).await?;
    let catalog = Catalog::open(&config).await?;

    let (event_sender, event_receiver) = distro_events::channel();
    let installer = Arc::new(CommandInstaller::from_config(&config.install));
    let orchestrator = OrchestratorBuilder::new()
        .with_store(catalog.store.clone())
        .with_installer(installer)
        .with_event_sender(event_sender)
        .with_config(config)
        .build()?;

    let json = cli.global.json;
    let colors = !json && console::Term::stderr().features().colors_supported();
    let interactive = !json && console::Term::stdout().is_term();
    let renderer = OutputRenderer::new(json, colors);
    let mut event_handler = EventHandler::new(colors, json, cli.global.debug);

    let command = execute_command(cli.command, &orchestrator, &catalog, interactive);
    let result = handle_events_until(command, event_receiver, &mut event_handler).await;

    // Metadata learned before a failure is still worth keeping
    catalog.persist().await?;
    let result = result?;
    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Drive `command` while rendering events as they arrive
async fn handle_events_until<F>(
    command: F,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError>
where
    F: std::future::Future<Output = Result<OperationResult, CliError>>,
{
    let mut command = Box::pin(command);
    loop {
        select! {
            result = &mut command => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }
            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    orchestrator: &Orchestrator,
    catalog: &Catalog,
    interactive: bool,
) -> Result<OperationResult, CliError> {
    match command {
        Commands::Download {
            version,
            ids,
            resume,
        } => {
            let ids = target_ids(&ids)?;
            let handle = orchestrator.submit_batch(&ids, version).await?;
            finish_batch(orchestrator, handle, resume, interactive).await
        }

        Commands::QuickLink { name, ids, resume } => {
            let ids = target_ids(&ids)?;
            let handle = orchestrator.submit_batch_by_quick_link(&ids, name).await?;
            finish_batch(orchestrator, handle, resume, interactive).await
        }

        Commands::Uninstall { ids, resume } => {
            let ids = target_ids(&ids)?;
            let report = orchestrator.submit_uninstall(&ids).await?;
            if interactive && !resume.no_wait {
                resume_loop(orchestrator).await?;
            }
            Ok(OperationResult::Uninstall(report))
        }

        Commands::Import { file } => {
            let json = tokio::fs::read_to_string(&file).await?;
            let list = ImportList::from_json(&json)?;
            let count = catalog.store.import(list);
            Ok(OperationResult::Imported { count })
        }

        Commands::Export { file } => {
            let list = catalog.store.export();
            let count = list.apps.len();
            tokio::fs::write(&file, list.to_json()?).await?;
            Ok(OperationResult::Exported { path: file, count })
        }

        Commands::List => Ok(OperationResult::Targets(catalog.store.list())),

        Commands::Clean => {
            let report = orchestrator.clean().await?;
            Ok(OperationResult::Cleaned {
                removed: report.removed.len(),
                protected: report.protected,
            })
        }
    }
}

fn target_ids(raw: &[i64]) -> Result<Vec<TargetId>, CliError> {
    if raw.is_empty() {
        return Err(distro_errors::Error::from(OpsError::NoTargetsSelected).into());
    }
    Ok(raw.iter().copied().map(TargetId).collect())
}

/// Wait for the batch (Ctrl-C cancels it), then walk the install queue
async fn finish_batch(
    orchestrator: &Orchestrator,
    mut handle: BatchHandle,
    resume: ResumeArgs,
    interactive: bool,
) -> Result<OperationResult, CliError> {
    let batch_id = handle.batch_id;
    let state = select! {
        state = handle.wait() => state,
        _ = tokio::signal::ctrl_c() => {
            warn!(%batch_id, "interrupted, cancelling batch");
            orchestrator.cancel().await?;
            return Err(distro_errors::Error::Cancelled.into());
        }
    };

    if interactive && !resume.no_wait {
        resume_loop(orchestrator).await?;
    }

    Ok(OperationResult::Batch {
        state,
        pending_installs: orchestrator.install_queue().await,
    })
}

/// Enter acts as the resume signal until both queues are drained
async fn resume_loop(orchestrator: &Orchestrator) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut deferred = Vec::new();

    loop {
        let installs = orchestrator.install_queue().await;
        let removals = orchestrator.pending_uninstalls().await;
        if installs.is_empty() && removals.is_empty() {
            break;
        }

        eprint!("Press Enter once the system prompt is closed (q to stop): ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }

        let report = orchestrator.on_resume().await;
        deferred.extend(report.deferred_delete);
        if let Err(e) = report.sweep {
            warn!(error = %e, "stale artifact sweep failed");
        }
    }

    for handle in deferred {
        if let Err(e) = handle.await {
            warn!(error = %e, "deferred delete task failed");
        }
    }
    Ok(())
}

/// Initialize tracing
///
/// `RUST_LOG` wins; otherwise `info` (or `debug` with `--debug`) for distro
/// crates and `warn` for everything else. `--json` switches to JSON lines.
fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "warn,distro=debug,distro_ops=debug,distro_net=debug,distro_install=debug"
    } else {
        "warn,distro=info,distro_ops=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(debug_enabled)
            .with_env_filter(filter)
            .init();
    }
}
