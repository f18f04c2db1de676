//! Snapshotting an environment's `site-packages`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::requirements::RequirementEntry;

use super::metadata::{parse_metadata, parse_requires_txt, DistributionMetadata};
use super::{InstalledDistribution, Inventory, InventorySource};

/// Inventory source that reads the metadata installed under one
/// environment root.
///
/// Only the environment's own `site-packages` directories are read, so
/// packages inherited from a parent interpreter never show up.
#[derive(Debug, Clone)]
pub struct SitePackages {
    root: PathBuf,
}

impl SitePackages {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The `site-packages` directories that exist under the root.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = Vec::new();
        let mut seen: Vec<PathBuf> = Vec::new();

        let mut candidates = Vec::new();
        for lib in ["lib", "lib64"] {
            let Ok(entries) = fs::read_dir(self.root.join(lib)) else {
                continue;
            };
            let mut pythons: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| {
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("python"))
                })
                .collect();
            pythons.sort();
            candidates.extend(pythons.into_iter().map(|p| p.join("site-packages")));
        }
        candidates.push(self.root.join("Lib").join("site-packages"));

        for candidate in candidates {
            if !candidate.is_dir() {
                continue;
            }
            let identity = fs::canonicalize(&candidate).unwrap_or_else(|_| candidate.clone());
            if seen.contains(&identity) {
                continue;
            }
            seen.push(identity);
            found.push(candidate);
        }
        found
    }
}

impl InventorySource for SitePackages {
    fn snapshot(&self) -> Result<Inventory> {
        let mut distributions = Vec::new();
        for dir in self.directories() {
            let mut entries: Vec<PathBuf> = fs::read_dir(&dir)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .collect();
            entries.sort();

            for path in entries {
                if let Some(metadata) = read_distribution(&path)? {
                    distributions.push(to_distribution(metadata, &path));
                }
            }
        }

        let inventory = Inventory::from_distributions(distributions);
        tracing::debug!(
            "Snapshot of {} found {} package(s)",
            self.root.display(),
            inventory.len()
        );
        Ok(inventory)
    }
}

fn read_distribution(path: &Path) -> Result<Option<DistributionMetadata>> {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };

    let metadata = if file_name.ends_with(".dist-info") {
        read_optional(&path.join("METADATA"))?.and_then(|c| parse_metadata(&c))
    } else if file_name.ends_with(".egg-info") {
        if path.is_dir() {
            let mut metadata =
                read_optional(&path.join("PKG-INFO"))?.and_then(|c| parse_metadata(&c));
            if let (Some(meta), Some(requires)) =
                (metadata.as_mut(), read_optional(&path.join("requires.txt"))?)
            {
                meta.requires.extend(parse_requires_txt(&requires));
            }
            metadata
        } else {
            read_optional(path)?.and_then(|c| parse_metadata(&c))
        }
    } else {
        return Ok(None);
    };

    if metadata.is_none() {
        tracing::warn!("Skipping unreadable package metadata in {}", path.display());
    }
    Ok(metadata)
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
            tracing::warn!("{} is not valid UTF-8", path.display());
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn to_distribution(metadata: DistributionMetadata, path: &Path) -> InstalledDistribution {
    let requires = metadata
        .requires
        .iter()
        .filter_map(|text| {
            let entry = RequirementEntry::parse(text);
            if entry.is_none() {
                tracing::warn!(
                    "Ignoring unparseable dependency {:?} declared in {}",
                    text,
                    path.display()
                );
            }
            entry
        })
        .collect();
    InstalledDistribution::new(&metadata.name, &metadata.version, requires)
}
