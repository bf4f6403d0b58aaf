//! # credreg CLI entry point
//!
//! Parses command-line arguments, loads the configuration and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use credreg_cli::config::OrchestratorConfig;
use credreg_cli::diploma::{run_issue, run_reassign, run_revoke, IssueArgs, ReassignArgs, RevokeArgs};
use credreg_cli::inspect::{run_global, run_inspect, GlobalArgs, InspectArgs};
use credreg_cli::lifecycle::{run_delete, run_deploy, run_update, DeleteArgs, DeployArgs, UpdateArgs};
use credreg_cli::membership::{run_clear, run_close_out, run_opt_in, MembershipArgs};

/// Credential registry orchestrator.
///
/// Deploys registry instances, manages opt-ins, and issues, revokes and
/// inspects diplomas against a local ledger.
#[derive(Parser, Debug)]
#[command(name = "credreg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (default: ./credreg.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a registry instance; the sender becomes its registrar.
    Deploy(DeployArgs),

    /// Replace the programs of an instance.
    Update(UpdateArgs),

    /// Destroy an instance and every local record under it.
    Delete(DeleteArgs),

    /// Allocate a local record for an account.
    OptIn(MembershipArgs),

    /// Remove an account's local record through the approval logic.
    CloseOut(MembershipArgs),

    /// Remove an account's local record unconditionally.
    Clear(MembershipArgs),

    /// Issue a diploma to an opted-in account.
    Issue(IssueArgs),

    /// Revoke an account's diploma.
    Revoke(RevokeArgs),

    /// Hand the registrar role to another account.
    Reassign(ReassignArgs),

    /// Show an account's local record.
    Inspect(InspectArgs),

    /// Show the instance's global record.
    Global(GlobalArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match OrchestratorConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(ledger = %config.ledger_path.display(), "configuration loaded");

    let result = match &cli.command {
        Commands::Deploy(args) => run_deploy(args, &config),
        Commands::Update(args) => run_update(args, &config),
        Commands::Delete(args) => run_delete(args, &config),
        Commands::OptIn(args) => run_opt_in(args, &config),
        Commands::CloseOut(args) => run_close_out(args, &config),
        Commands::Clear(args) => run_clear(args, &config),
        Commands::Issue(args) => run_issue(args, &config),
        Commands::Revoke(args) => run_revoke(args, &config),
        Commands::Reassign(args) => run_reassign(args, &config),
        Commands::Inspect(args) => run_inspect(args, &config),
        Commands::Global(args) => run_global(args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
