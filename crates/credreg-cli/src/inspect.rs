//! # Read-only Subcommands
//!
//! `inspect` prints one account's local record and `global` prints the
//! instance record, both as pretty JSON on stdout. Neither submits anything.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use credreg_core::{Address, ByteString, InstanceId};
use credreg_state::LocalRecord;

use crate::client::{InstanceArgs, Session};
use crate::config::OrchestratorConfig;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Account alias or address whose local record to show.
    #[arg(long)]
    pub account: String,

    #[command(flatten)]
    pub target: InstanceArgs,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    #[command(flatten)]
    pub target: InstanceArgs,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LocalView {
    pub app_id: InstanceId,
    pub account: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diploma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree_duration: Option<u64>,
}

impl LocalView {
    fn new(app_id: InstanceId, account: Address, record: LocalRecord) -> Self {
        Self {
            app_id,
            account,
            diploma: record.diploma.as_ref().map(render_bytes),
            degree_duration: record.degree_duration,
        }
    }
}

/// UTF-8 text when valid, else base64.
fn render_bytes(bytes: &ByteString) -> String {
    bytes
        .as_utf8()
        .map(str::to_string)
        .unwrap_or_else(|| bytes.to_base64())
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct GlobalView {
    pub app_id: InstanceId,
    pub creator: Address,
    pub registrar: Option<Address>,
    pub approval_program: String,
    pub clear_program: String,
    pub round: u64,
}

pub fn run_inspect(args: &InspectArgs, config: &OrchestratorConfig) -> Result<u8> {
    let session = Session::open(config)?;
    let account = session.account(&args.account)?;
    let app = session.app_id(&args.target)?;

    match session.ledger().local_state(app, &account)? {
        Some(record) => {
            let view = LocalView::new(app, account, record);
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(0)
        }
        None => {
            println!("account {account} has not opted in to instance {app}");
            Ok(1)
        }
    }
}

pub fn run_global(args: &GlobalArgs, config: &OrchestratorConfig) -> Result<u8> {
    let session = Session::open(config)?;
    let app = session.app_id(&args.target)?;
    let ledger = session.ledger();
    let Some(instance) = ledger.instance(app) else {
        println!("instance {app} does not exist");
        return Ok(1);
    };
    let view = GlobalView {
        app_id: app,
        creator: instance.creator.clone(),
        registrar: instance.global.as_ref().map(|g| g.registrar.clone()),
        approval_program: instance.programs.approval.to_string(),
        clear_program: instance.programs.clear.to_string(),
        round: ledger.status(),
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(0)
}
