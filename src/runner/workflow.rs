//! The stage 2 install sequence.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::{Result, VenvUpdateError};
use crate::installer::{InstallRequest, Installer, WheelRequest};
use crate::inventory::{InstalledPackage, InventorySource};
use crate::reconcile::{protected_names, ReconciliationPlan};
use crate::requirements::{PackageName, RequirementEntry};
use crate::resolver::{resolve, Closure};
use crate::shell::interrupted;

/// What one run did.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Packages placed by the bootstrap install.
    pub bootstrapped: Vec<InstalledPackage>,
    /// Packages placed by the install from cache.
    pub installed: Vec<InstalledPackage>,
    /// Installed packages still needed by the requirement files.
    pub closure: Closure,
    /// Packages removed.
    pub uninstalled: BTreeSet<PackageName>,
}

impl RunReport {
    /// Names the installer placed during this run.
    pub fn recently_installed(&self) -> BTreeSet<PackageName> {
        self.bootstrapped
            .iter()
            .chain(&self.installed)
            .map(|package| package.name.clone())
            .collect()
    }

    /// Log a one-line summary plus the removed names.
    pub fn log_summary(&self) {
        tracing::info!(
            "Bootstrapped {}, installed {}, {} package(s) required, {} removed, {} conflict(s)",
            self.bootstrapped.len(),
            self.installed.len(),
            self.closure.len(),
            self.uninstalled.len(),
            self.closure.conflicts().len()
        );
        for name in &self.uninstalled {
            tracing::debug!("Removed {}", name);
        }
    }
}

/// Bootstrap, populate the cache, install from it, then remove whatever
/// the requirement files no longer need.
pub struct InstallWorkflow {
    requirement_files: Vec<PathBuf>,
    entries: Vec<RequirementEntry>,
    protected: BTreeSet<PackageName>,
    /// Polled between steps.
    interrupted: fn() -> bool,
}

impl InstallWorkflow {
    pub fn new(requirement_files: Vec<PathBuf>, entries: Vec<RequirementEntry>) -> Self {
        Self {
            requirement_files,
            entries,
            protected: protected_names(),
            interrupted,
        }
    }

    /// Run the four steps in order. The first failure stops the sequence.
    pub fn run(
        &self,
        inventory: &dyn InventorySource,
        installer: &mut dyn Installer,
    ) -> Result<RunReport> {
        let previous = inventory.snapshot()?;
        tracing::debug!("{} package(s) installed before this run", previous.len());

        let mut report = RunReport {
            bootstrapped: installer.install(&InstallRequest::bootstrap())?,
            ..Default::default()
        };
        self.checkpoint()?;

        installer.wheel(&WheelRequest::populate(
            self.requirement_files.clone(),
            self.entries.clone(),
        ))?;
        self.checkpoint()?;

        report.installed = installer.install(&InstallRequest::from_cache(
            self.requirement_files.clone(),
            self.entries.clone(),
        ))?;
        self.checkpoint()?;

        let current = inventory.snapshot()?;
        report.closure = resolve(&self.entries, &current)?;

        let plan = ReconciliationPlan::new(
            self.entries.clone(),
            &previous.names(),
            &report.closure.names(),
            &report.recently_installed(),
            &self.protected,
        );
        if plan.needs_uninstall() {
            installer.uninstall(&plan.to_uninstall)?;
            report.uninstalled = plan.to_uninstall;
        }

        Ok(report)
    }

    fn checkpoint(&self) -> Result<()> {
        if (self.interrupted)() {
            return Err(VenvUpdateError::Interrupted);
        }
        Ok(())
    }
}
