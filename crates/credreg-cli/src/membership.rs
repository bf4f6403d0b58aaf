//! Opt-in bookkeeping: `opt-in`, `close-out` and `clear`.

use anyhow::Result;
use clap::Args;

use credreg_core::{Address, InstanceId};
use credreg_ledger::Transaction;

use crate::client::{InstanceArgs, Session};
use crate::config::OrchestratorConfig;

/// Arguments shared by the three membership commands.
#[derive(Args, Debug)]
pub struct MembershipArgs {
    /// Account alias or address acting on its own local record.
    #[arg(long)]
    pub account: String,

    #[command(flatten)]
    pub target: InstanceArgs,
}

fn run_membership(
    args: &MembershipArgs,
    config: &OrchestratorConfig,
    build: fn(Address, InstanceId) -> Transaction,
) -> Result<u8> {
    let mut session = Session::open(config)?;
    let account = session.account(&args.account)?;
    let app = session.app_id(&args.target)?;
    Ok(session.send(&build(account, app))?.code())
}

pub fn run_opt_in(args: &MembershipArgs, config: &OrchestratorConfig) -> Result<u8> {
    run_membership(args, config, Transaction::opt_in)
}

pub fn run_close_out(args: &MembershipArgs, config: &OrchestratorConfig) -> Result<u8> {
    run_membership(args, config, Transaction::close_out)
}

/// Leaves unconditionally, even if the approval logic would refuse.
pub fn run_clear(args: &MembershipArgs, config: &OrchestratorConfig) -> Result<u8> {
    run_membership(args, config, Transaction::clear_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::tests::{deploy, workspace};

    fn student() -> MembershipArgs {
        MembershipArgs {
            account: "student".into(),
            target: InstanceArgs::default(),
        }
    }

    #[test]
    fn opt_in_twice_exits_non_zero() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path());
        deploy(&config);
        assert_eq!(run_opt_in(&student(), &config).unwrap(), 0);
        assert_eq!(run_opt_in(&student(), &config).unwrap(), 1);
    }

    #[test]
    fn close_out_and_clear_need_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path());
        deploy(&config);
        assert_eq!(run_close_out(&student(), &config).unwrap(), 1);
        assert_eq!(run_clear(&student(), &config).unwrap(), 1);

        assert_eq!(run_opt_in(&student(), &config).unwrap(), 0);
        assert_eq!(run_close_out(&student(), &config).unwrap(), 0);
        assert_eq!(run_opt_in(&student(), &config).unwrap(), 0);
        assert_eq!(run_clear(&student(), &config).unwrap(), 0);
        assert_eq!(run_clear(&student(), &config).unwrap(), 1);
    }
}
