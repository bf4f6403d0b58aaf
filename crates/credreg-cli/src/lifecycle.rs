//! # Instance Lifecycle Subcommands
//!
//! - `deploy`: create an instance from the configured programs and record
//!   its id in the artifacts file.
//! - `update`: replace the programs of an instance (registrar only).
//! - `delete`: destroy an instance (registrar only) and forget its id.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use credreg_core::ByteString;
use credreg_ledger::Transaction;

use crate::artifacts::Artifacts;
use crate::client::{InstanceArgs, Outcome, Session};
use crate::config::OrchestratorConfig;

/// Program overrides for `deploy` and `update`.
#[derive(Args, Debug, Clone, Default)]
pub struct ProgramArgs {
    /// Approval program file. Defaults to `approval_program` from the config.
    #[arg(long)]
    pub approval: Option<PathBuf>,

    /// Clear-state program file. Defaults to `clear_program` from the config.
    #[arg(long)]
    pub clear: Option<PathBuf>,
}

impl ProgramArgs {
    fn read(&self, config: &OrchestratorConfig) -> Result<(ByteString, ByteString)> {
        let approval = self.approval.as_deref().unwrap_or(config.approval_program.as_path());
        let clear = self.clear.as_deref().unwrap_or(config.clear_program.as_path());
        Ok((read_program(approval)?, read_program(clear)?))
    }
}

fn read_program(path: &Path) -> Result<ByteString> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read program: {}", path.display()))?;
    Ok(ByteString::new(bytes))
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Creating account; becomes the registrar.
    #[arg(long)]
    pub sender: String,

    #[command(flatten)]
    pub programs: ProgramArgs,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[arg(long)]
    pub sender: String,

    #[command(flatten)]
    pub programs: ProgramArgs,

    #[command(flatten)]
    pub target: InstanceArgs,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[arg(long)]
    pub sender: String,

    #[command(flatten)]
    pub target: InstanceArgs,
}

pub fn run_deploy(args: &DeployArgs, config: &OrchestratorConfig) -> Result<u8> {
    let mut session = Session::open(config)?;
    let sender = session.account(&args.sender)?;
    let (approval, clear) = args.programs.read(config)?;

    let outcome = session.send(&Transaction::create(sender, approval, clear))?;
    if let Outcome::Confirmed(record) = &outcome {
        Artifacts {
            app_id: record.application,
        }
        .save(&config.artifacts_path)?;
        println!("deployed instance {}", record.application);
    }
    Ok(outcome.code())
}

pub fn run_update(args: &UpdateArgs, config: &OrchestratorConfig) -> Result<u8> {
    let mut session = Session::open(config)?;
    let sender = session.account(&args.sender)?;
    let app = session.app_id(&args.target)?;
    let (approval, clear) = args.programs.read(config)?;

    let outcome = session.send(&Transaction::update(sender, app, approval, clear))?;
    Ok(outcome.code())
}

pub fn run_delete(args: &DeleteArgs, config: &OrchestratorConfig) -> Result<u8> {
    let mut session = Session::open(config)?;
    let sender = session.account(&args.sender)?;
    let app = session.app_id(&args.target)?;

    let outcome = session.send(&Transaction::delete(sender, app))?;
    if let Outcome::Confirmed(_) = outcome {
        let recorded = Artifacts::load(&config.artifacts_path)?;
        if recorded.map(|a| a.app_id) == Some(app) {
            Artifacts::remove(&config.artifacts_path)?;
        }
        println!("deleted instance {app}");
    }
    Ok(outcome.code())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use credreg_core::Address;

    /// Config rooted in `dir` with program files and two aliases.
    pub(crate) fn workspace(dir: &Path) -> OrchestratorConfig {
        let assets = dir.join("assets");
        std::fs::create_dir_all(&assets).unwrap();
        std::fs::write(assets.join("diploma_approval.teal"), "#pragma version 6\n").unwrap();
        std::fs::write(assets.join("clear_program.teal"), "#pragma version 6\nint 1\n").unwrap();
        let yaml = "accounts:\n  registrar: REGISTRAR\n  student: STUDENT\n";
        let path = dir.join("credreg.yaml");
        std::fs::write(&path, yaml).unwrap();
        OrchestratorConfig::from_file(&path).unwrap()
    }

    pub(crate) fn deploy(config: &OrchestratorConfig) {
        let args = DeployArgs {
            sender: "registrar".into(),
            programs: ProgramArgs::default(),
        };
        assert_eq!(run_deploy(&args, config).unwrap(), 0);
    }

    #[test]
    fn deploy_records_instance_and_registrar() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path());
        deploy(&config);

        let app = Artifacts::load(&config.artifacts_path).unwrap().unwrap().app_id;
        let session = Session::open(&config).unwrap();
        let global = session.ledger().global_state(app).unwrap().unwrap();
        assert_eq!(global.registrar, Address::new("REGISTRAR").unwrap());
    }

    #[test]
    fn deploy_without_program_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path());
        let args = DeployArgs {
            sender: "registrar".into(),
            programs: ProgramArgs {
                approval: Some(dir.path().join("missing.teal")),
                clear: None,
            },
        };
        assert!(run_deploy(&args, &config).is_err());
        assert!(!config.artifacts_path.exists());
    }

    #[test]
    fn update_by_outsider_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path());
        deploy(&config);
        let args = UpdateArgs {
            sender: "student".into(),
            programs: ProgramArgs::default(),
            target: InstanceArgs::default(),
        };
        assert_eq!(run_update(&args, &config).unwrap(), 1);
        let args = UpdateArgs {
            sender: "registrar".into(),
            ..args
        };
        assert_eq!(run_update(&args, &config).unwrap(), 0);
    }

    #[test]
    fn delete_forgets_recorded_instance() {
        let dir = tempfile::tempdir().unwrap();
        let config = workspace(dir.path());
        deploy(&config);
        let args = DeleteArgs {
            sender: "registrar".into(),
            target: InstanceArgs::default(),
        };
        assert_eq!(run_delete(&args, &config).unwrap(), 0);
        assert!(!config.artifacts_path.exists());
        // Nothing left to delete.
        assert!(run_delete(&args, &config).is_err());
    }
}
