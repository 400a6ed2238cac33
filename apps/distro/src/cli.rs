//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// distro - bulk package download and install orchestrator
#[derive(Parser)]
#[command(name = "distro")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Download packages in bulk and install them one prompt at a time")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the download concurrency cap
    #[arg(long, global = true, value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Override the temporary artifact directory
    #[arg(long, global = true, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,
}

/// Controls the interactive resume loop after a submission
#[derive(Args, Clone, Copy)]
pub struct ResumeArgs {
    /// Return as soon as downloads finish instead of walking the install queue
    #[arg(long)]
    pub no_wait: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Download targets at a version and queue them for install
    #[command(alias = "dl")]
    Download {
        /// Version substituted into each URL pattern
        #[arg(long, short = 'v')]
        version: String,

        /// Target ids (see `distro list`)
        ids: Vec<i64>,

        #[command(flatten)]
        resume: ResumeArgs,
    },

    /// Download targets through a named quick link
    #[command(alias = "ql")]
    QuickLink {
        /// Quick link name, matched exactly
        #[arg(long, short = 'n')]
        name: String,

        /// Target ids (see `distro list`)
        ids: Vec<i64>,

        #[command(flatten)]
        resume: ResumeArgs,
    },

    /// Request removal of installed targets
    #[command(alias = "rm")]
    Uninstall {
        /// Target ids (see `distro list`)
        ids: Vec<i64>,

        #[command(flatten)]
        resume: ResumeArgs,
    },

    /// Import targets from a JSON document
    Import {
        /// Path to the import document
        file: PathBuf,
    },

    /// Export targets to a JSON document
    Export {
        /// Destination path
        file: PathBuf,
    },

    /// List configured targets
    #[command(alias = "ls")]
    List,

    /// Remove temporary artifacts
    Clean,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn download_takes_version_and_ids() {
        let cli = Cli::parse_from(["distro", "download", "-v", "1.2.0", "3", "4", "--no-wait"]);
        match cli.command {
            Commands::Download {
                version,
                ids,
                resume,
            } => {
                assert_eq!(version, "1.2.0");
                assert_eq!(ids, [3, 4]);
                assert!(resume.no_wait);
            }
            _ => panic!("expected download"),
        }
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::parse_from(["distro", "ql", "--name", "beta", "1", "--json"]);
        assert!(cli.global.json);
        assert!(matches!(cli.command, Commands::QuickLink { ref name, .. } if name == "beta"));
    }
}
