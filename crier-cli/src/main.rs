//! Crier: track where each article has been cross-posted and keep it in sync.
//!
//! # Usage
//!
//! ```text
//! crier audit [PATH] [--to P] [--profile NAME] [--include-changed] [--include-archived]
//!             [--publish] [--retry] [--dry-run] [--json]
//! crier publish FILE [--to P] [--profile NAME] [--dry-run] [--json]
//! crier status [FILE|URL] [--all] [--json]
//! crier failures [--json]
//! crier archive FILE|URL
//! crier unarchive FILE|URL
//! crier delete FILE|URL --from P
//! crier forget URL [--platform P]
//! crier stats [--refresh] [--json]
//! ```
//!
//! Exit codes: 0 when everything attempted succeeded, 1 when nothing did
//! (or on an error), 2 when a batch partly failed.

mod command_platform;
mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{
    archive::ArchiveArgs, audit::AuditArgs, delete::DeleteArgs, failures::FailuresArgs,
    forget::ForgetArgs, publish::PublishArgs, stats::StatsArgs, status::StatusArgs, Workspace,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "crier",
    version,
    about = "Cross-post articles and keep a registry of where they live",
    long_about = None,
)]
struct Cli {
    /// Configuration file (default: $CRIER_CONFIG, .crier/config.yaml, then the user config dir).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare content files against the registry; optionally act on the gaps.
    Audit(AuditArgs),

    /// Publish or update one file on its target platforms.
    Publish(PublishArgs),

    /// Show where an article (or every article) is published.
    Status(StatusArgs),

    /// List platforms whose most recent attempt failed.
    Failures(FailuresArgs),

    /// Exclude an article from bulk audits.
    Archive(ArchiveArgs),

    /// Include a previously archived article in bulk audits again.
    Unarchive(ArchiveArgs),

    /// Delete a post from a platform, keeping the record.
    Delete(DeleteArgs),

    /// Drop registry records without contacting any platform.
    Forget(ForgetArgs),

    /// Show cached engagement stats.
    Stats(StatsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let ws = Workspace::open(cli.config.as_deref())?;
    match cli.command {
        Commands::Audit(args) => args.run(&ws),
        Commands::Publish(args) => args.run(&ws),
        Commands::Status(args) => args.run(&ws),
        Commands::Failures(args) => args.run(&ws),
        Commands::Archive(args) => args.run(&ws, true),
        Commands::Unarchive(args) => args.run(&ws, false),
        Commands::Delete(args) => args.run(&ws),
        Commands::Forget(args) => args.run(&ws),
        Commands::Stats(args) => args.run(&ws),
    }
}

/// Diagnostics go to stderr so `--json` output stays parseable.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("CRIER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
