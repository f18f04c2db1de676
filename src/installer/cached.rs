//! Offline shortcut for requirements already in the wheel cache.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VenvUpdateError};
use crate::inventory::InstalledPackage;
use crate::requirements::{PackageName, RequirementEntry, Version};

use super::{InstallRequest, Installer, WheelRequest};

/// Wraps an installer and skips network work that the wheel cache makes
/// redundant.
///
/// When every requirement in a request is pinned (`name==version`), asks for
/// no extras, and a wheel for that exact version is already in the cache,
/// the wheel build is skipped and installs run offline against the cache.
/// Anything unpinned, URL-based, or missing goes to the wrapped installer
/// unchanged.
///
/// A cached top-level wheel says nothing about its dependencies. If an
/// offline install that relied on a shortcut fails, the skipped work is done
/// after all and the install is retried once.
#[derive(Debug)]
pub struct CacheFirst<I> {
    inner: I,
    wheel_dir: PathBuf,
    skipped_build: Option<WheelRequest>,
}

impl<I: Installer> CacheFirst<I> {
    pub fn new(inner: I, wheel_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            wheel_dir: wheel_dir.into(),
            skipped_build: None,
        }
    }

    /// Whether every entry is pinned, extra-free and already has a cached
    /// wheel.
    pub fn fully_cached(&self, entries: &[RequirementEntry]) -> bool {
        !entries.is_empty()
            && entries.iter().all(|entry| {
                if !entry.extras.is_empty() {
                    return false;
                }
                match (entry.name.as_ref(), entry.pinned_version()) {
                    (Some(name), Some(version)) => {
                        cached_wheel(&self.wheel_dir, name, version).is_some()
                    }
                    _ => false,
                }
            })
    }
}

impl<I: Installer> Installer for CacheFirst<I> {
    fn install(&mut self, request: &InstallRequest) -> Result<Vec<InstalledPackage>> {
        if !request.offline && self.fully_cached(&request.entries) {
            tracing::debug!("All {} requirement(s) cached; installing offline", request.entries.len());
            let offline = InstallRequest {
                offline: true,
                ..request.clone()
            };
            return match self.inner.install(&offline) {
                Err(VenvUpdateError::InstallerFailed { code, .. }) => {
                    tracing::warn!("Offline install failed with code {code}; retrying online");
                    self.inner.install(request)
                }
                result => result,
            };
        }

        let skipped = if request.offline {
            self.skipped_build.take()
        } else {
            None
        };
        let Some(skipped) = skipped else {
            return self.inner.install(request);
        };
        match self.inner.install(request) {
            Err(VenvUpdateError::InstallerFailed { code, .. }) => {
                tracing::warn!(
                    "Offline install failed with code {code}; cached wheels are incomplete, building them"
                );
                self.inner.wheel(&skipped)?;
                self.inner.install(request)
            }
            result => result,
        }
    }

    fn wheel(&mut self, request: &WheelRequest) -> Result<()> {
        if self.fully_cached(&request.entries) {
            tracing::info!(
                "All {} requirement(s) already in {}; skipping wheel build",
                request.entries.len(),
                self.wheel_dir.display()
            );
            self.skipped_build = Some(request.clone());
            return Ok(());
        }
        self.skipped_build = None;
        self.inner.wheel(request)
    }

    fn uninstall(&mut self, names: &BTreeSet<PackageName>) -> Result<()> {
        self.inner.uninstall(names)
    }
}

/// Find `{name}-{version}-*.whl` in `wheel_dir`, comparing names
/// normalized and versions semantically.
pub fn cached_wheel(wheel_dir: &Path, name: &PackageName, version: &str) -> Option<PathBuf> {
    let wanted = Version::parse(version);
    let entries = fs::read_dir(wheel_dir).ok()?;
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            let Some(stem) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(".whl"))
            else {
                return false;
            };
            let mut parts = stem.split('-');
            match (parts.next(), parts.next()) {
                (Some(dist), Some(dist_version)) => {
                    PackageName::new(dist) == *name && Version::parse(dist_version) == wanted
                }
                _ => false,
            }
        })
}
