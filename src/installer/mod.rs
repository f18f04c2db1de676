//! The package installer, treated as an opaque collaborator.
//!
//! - [`Installer`] - install / wheel-build / uninstall verbs
//! - [`pip`] - The environment's own `pip`
//! - [`cached`] - Offline shortcut for requirements already in the wheel cache
//! - [`report`] - What an install actually placed

pub mod cached;
pub mod pip;
pub mod report;

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::Result;
use crate::inventory::InstalledPackage;
use crate::requirements::{PackageName, RequirementEntry};

pub use cached::CacheFirst;
pub use pip::PipInstaller;

/// Pinned tooling installed before anything else: the installer's own
/// wheel-building dependency.
pub const BOOTSTRAP: &[&str] = &["wheel==0.43.0"];

/// The bootstrap set as requirement entries.
pub fn bootstrap_entries() -> Vec<RequirementEntry> {
    BOOTSTRAP
        .iter()
        .filter_map(|spec| RequirementEntry::parse(spec))
        .collect()
}

/// Arguments for one install call.
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    /// Requirement strings passed directly on the command line.
    pub packages: Vec<String>,
    /// Requirement files passed with `-r`.
    pub requirement_files: Vec<PathBuf>,
    /// Everything the call asks for, parsed. Used for cache lookups only.
    pub entries: Vec<RequirementEntry>,
    /// Upgrade packages that are already installed.
    pub upgrade: bool,
    /// Install from the local wheel cache only.
    pub offline: bool,
}

impl InstallRequest {
    /// Step 1: the bootstrap set, upgraded, network allowed.
    pub fn bootstrap() -> Self {
        Self {
            packages: BOOTSTRAP.iter().map(ToString::to_string).collect(),
            entries: bootstrap_entries(),
            upgrade: true,
            ..Default::default()
        }
    }

    /// Step 3: the requirement files, from the wheel cache only.
    pub fn from_cache(requirement_files: Vec<PathBuf>, entries: Vec<RequirementEntry>) -> Self {
        Self {
            requirement_files,
            entries,
            offline: true,
            ..Default::default()
        }
    }
}

/// Arguments for one wheel-build call.
#[derive(Debug, Clone, Default)]
pub struct WheelRequest {
    pub packages: Vec<String>,
    pub requirement_files: Vec<PathBuf>,
    pub entries: Vec<RequirementEntry>,
}

impl WheelRequest {
    /// Step 2: the bootstrap set plus the requirement files.
    pub fn populate(requirement_files: Vec<PathBuf>, entries: Vec<RequirementEntry>) -> Self {
        let mut all = bootstrap_entries();
        all.extend(entries);
        Self {
            packages: BOOTSTRAP.iter().map(ToString::to_string).collect(),
            requirement_files,
            entries: all,
        }
    }
}

/// The verbs the orchestrator needs from an installer. Each call blocks
/// and fails with the installer's exit code.
pub trait Installer {
    /// Install, returning the packages actually placed.
    fn install(&mut self, request: &InstallRequest) -> Result<Vec<InstalledPackage>>;

    /// Build wheels into the cache without installing them.
    fn wheel(&mut self, request: &WheelRequest) -> Result<()>;

    /// Remove `names` in one batch.
    fn uninstall(&mut self, names: &BTreeSet<PackageName>) -> Result<()>;
}
