//! Installation reports written by `pip install --report`.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, VenvUpdateError};
use crate::inventory::InstalledPackage;

/// The subset of pip's installation report we read.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationReport {
    #[serde(default)]
    pub install: Vec<InstallationItem>,
}

/// One distribution the installer placed.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationItem {
    pub metadata: ItemMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemMetadata {
    pub name: String,
    pub version: String,
}

impl InstallationReport {
    /// The packages listed under `install`.
    pub fn installed(&self) -> Vec<InstalledPackage> {
        self.install
            .iter()
            .map(|item| InstalledPackage::new(&item.metadata.name, &item.metadata.version))
            .collect()
    }
}

/// Parse the report at `path`. An empty file means nothing was reported.
pub fn read_report(path: &Path) -> Result<Vec<InstalledPackage>> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        tracing::warn!("Installer wrote no report to {}", path.display());
        return Ok(Vec::new());
    }
    parse_report(&content, path)
}

/// Parse report JSON. `path` is only used in errors.
pub fn parse_report(content: &str, path: &Path) -> Result<Vec<InstalledPackage>> {
    let report: InstallationReport =
        serde_json::from_str(content).map_err(|err| VenvUpdateError::InvalidReport {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    Ok(report.installed())
}
