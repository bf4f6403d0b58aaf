//! # Registrar Subcommands
//!
//! `issue`, `revoke` and `reassign` each build one application call whose
//! first argument is the operation selector and whose single referenced
//! account is the subject of the operation.

use anyhow::Result;
use clap::Args;

use credreg_core::{encode_args, AppArg};
use credreg_ledger::Transaction;
use credreg_state::Operation;

use crate::client::{InstanceArgs, Session};
use crate::config::OrchestratorConfig;

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Registrar alias or address.
    #[arg(long)]
    pub sender: String,

    /// Opted-in account receiving the diploma.
    #[arg(long)]
    pub recipient: String,

    /// Diploma metadata, e.g. `Alice::BSc::2020`.
    #[arg(long)]
    pub metadata: String,

    /// Degree duration in years.
    #[arg(long)]
    pub duration: u64,

    #[command(flatten)]
    pub target: InstanceArgs,
}

#[derive(Args, Debug)]
pub struct RevokeArgs {
    #[arg(long)]
    pub sender: String,

    #[arg(long)]
    pub recipient: String,

    #[command(flatten)]
    pub target: InstanceArgs,
}

#[derive(Args, Debug)]
pub struct ReassignArgs {
    #[arg(long)]
    pub sender: String,

    /// Account that becomes the registrar.
    #[arg(long)]
    pub new_registrar: String,

    #[command(flatten)]
    pub target: InstanceArgs,
}

fn run_call(
    config: &OrchestratorConfig,
    sender: &str,
    subject: &str,
    target: &InstanceArgs,
    args: &[AppArg],
) -> Result<u8> {
    let mut session = Session::open(config)?;
    let sender = session.account(sender)?;
    let subject = session.account(subject)?;
    let app = session.app_id(target)?;
    let txn = Transaction::call(sender, app, encode_args(args), vec![subject]);
    Ok(session.send(&txn)?.code())
}

fn selector(operation: Operation) -> AppArg {
    AppArg::Str(operation.selector().to_string())
}

pub fn run_issue(args: &IssueArgs, config: &OrchestratorConfig) -> Result<u8> {
    run_call(
        config,
        &args.sender,
        &args.recipient,
        &args.target,
        &[
            selector(Operation::IssueDiploma),
            AppArg::Str(args.metadata.clone()),
            AppArg::Uint(args.duration),
        ],
    )
}

pub fn run_revoke(args: &RevokeArgs, config: &OrchestratorConfig) -> Result<u8> {
    run_call(
        config,
        &args.sender,
        &args.recipient,
        &args.target,
        &[selector(Operation::RevokeDiploma)],
    )
}

pub fn run_reassign(args: &ReassignArgs, config: &OrchestratorConfig) -> Result<u8> {
    run_call(
        config,
        &args.sender,
        &args.new_registrar,
        &args.target,
        &[selector(Operation::ReassignRegistrar)],
    )
}
