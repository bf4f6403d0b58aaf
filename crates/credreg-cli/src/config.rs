//! # Orchestrator Configuration
//!
//! Loaded from YAML. Every field has a default, so a missing default file
//! and an empty file both yield a usable configuration. Relative paths are
//! resolved against the directory holding the configuration file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use credreg_core::Address;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "credreg.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrchestratorConfig {
    /// Ledger snapshot.
    pub ledger_path: PathBuf,
    /// JSON file recording the deployed instance id.
    pub artifacts_path: PathBuf,
    pub approval_program: PathBuf,
    pub clear_program: PathBuf,
    /// Round budget for confirmation polling.
    pub confirmation_rounds: u64,
    /// Account aliases, e.g. `registrar: REGISTRAR`.
    pub accounts: BTreeMap<String, Address>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(".credreg/ledger.json"),
            artifacts_path: PathBuf::from(".credreg/artifacts.json"),
            approval_program: PathBuf::from("assets/diploma_approval.teal"),
            clear_program: PathBuf::from("assets/clear_program.teal"),
            confirmation_rounds: 10,
            accounts: BTreeMap::new(),
        }
    }
}

impl OrchestratorConfig {
    /// Load `explicit` if given (it must exist), else the default file if
    /// present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE}, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        // An empty document deserializes as null, not as an empty mapping.
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        };
        if config.confirmation_rounds == 0 {
            bail!("confirmation_rounds must be > 0 in {}", path.display());
        }
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.rebased(base))
    }

    fn rebased(mut self, base: &Path) -> Self {
        for path in [
            &mut self.ledger_path,
            &mut self.artifacts_path,
            &mut self.approval_program,
            &mut self.clear_program,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Resolve an alias, falling back to reading `name` as a raw address.
    pub fn resolve_account(&self, name: &str) -> Result<Address> {
        if let Some(address) = self.accounts.get(name) {
            return Ok(address.clone());
        }
        Address::new(name)
            .with_context(|| format!("{name:?} is neither a configured alias nor an address"))
    }
}
