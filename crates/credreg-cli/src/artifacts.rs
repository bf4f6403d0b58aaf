//! Deployment artifacts: the instance id `deploy` produced.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use credreg_core::InstanceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    pub app_id: InstanceId,
}

impl Artifacts {
    /// `Ok(None)` if nothing has been deployed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read artifacts: {}", path.display()))?;
        let artifacts = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse artifacts: {}", path.display()))?;
        Ok(Some(artifacts))
    }

    /// Written to a sibling temp file and renamed into place.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let mut tmp = path.as_os_str().to_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, json)
            .with_context(|| format!("failed to write artifacts: {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("failed to write artifacts: {}", path.display()))
    }

    pub fn remove(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("failed to remove artifacts: {}", path.display()))?;
        }
        Ok(())
    }
}
