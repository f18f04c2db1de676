//! Installed-package inventory.
//!
//! An [`Inventory`] is an immutable snapshot of the distributions installed
//! in one environment, keyed by normalized name. It doubles as the
//! dependency index the resolver walks: each distribution carries the
//! requirements it declared when it was installed.
//!
//! # Modules
//!
//! - [`metadata`] - `METADATA` / `PKG-INFO` / `requires.txt` parsing
//! - [`scan`] - Snapshotting an environment's `site-packages`

pub mod metadata;
pub mod scan;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::Result;
use crate::requirements::{PackageName, RequirementEntry};

pub use scan::SitePackages;

/// A package present in the environment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstalledPackage {
    pub name: PackageName,
    pub version: String,
}

impl InstalledPackage {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: PackageName::new(name),
            version: version.trim().to_string(),
        }
    }
}

impl fmt::Display for InstalledPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

/// An installed package together with its declared dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledDistribution {
    pub package: InstalledPackage,
    pub requires: Vec<RequirementEntry>,
}

impl InstalledDistribution {
    pub fn new(name: &str, version: &str, requires: Vec<RequirementEntry>) -> Self {
        Self {
            package: InstalledPackage::new(name, version),
            requires,
        }
    }
}

/// A snapshot of installed distributions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    distributions: BTreeMap<PackageName, InstalledDistribution>,
}

impl Inventory {
    /// Build an inventory. The first distribution seen for a name wins.
    pub fn from_distributions(distributions: impl IntoIterator<Item = InstalledDistribution>) -> Self {
        let mut map = BTreeMap::new();
        for dist in distributions {
            let name = dist.package.name.clone();
            if map.contains_key(&name) {
                tracing::warn!("Ignoring duplicate installation of {}", dist.package);
                continue;
            }
            map.insert(name, dist);
        }
        Self { distributions: map }
    }

    /// Look up an installed distribution by normalized name.
    pub fn get(&self, name: &PackageName) -> Option<&InstalledDistribution> {
        self.distributions.get(name)
    }

    pub fn contains(&self, name: &PackageName) -> bool {
        self.distributions.contains_key(name)
    }

    /// Every installed package.
    pub fn packages(&self) -> BTreeSet<InstalledPackage> {
        self.distributions
            .values()
            .map(|dist| dist.package.clone())
            .collect()
    }

    /// Every installed package name.
    pub fn names(&self) -> BTreeSet<PackageName> {
        self.distributions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }
}

/// Something that can snapshot an environment's installed packages.
pub trait InventorySource {
    /// Take a fresh snapshot. Snapshots are never updated in place.
    fn snapshot(&self) -> Result<Inventory>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_normalized_on_construction() {
        let inventory = Inventory::from_distributions([InstalledDistribution::new(
            "Foo_Bar",
            "1.0",
            vec![],
        )]);
        assert!(inventory.contains(&PackageName::new("foo-bar")));
        assert_eq!(
            inventory.packages().into_iter().next().unwrap().to_string(),
            "foo-bar==1.0"
        );
    }

    #[test]
    fn first_duplicate_wins() {
        let inventory = Inventory::from_distributions([
            InstalledDistribution::new("six", "1.16.0", vec![]),
            InstalledDistribution::new("Six", "1.0.0", vec![]),
        ]);
        assert_eq!(inventory.len(), 1);
        let six = inventory.get(&PackageName::new("six")).unwrap();
        assert_eq!(six.package.version, "1.16.0");
    }

    #[test]
    fn empty_inventory() {
        let inventory = Inventory::default();
        assert!(inventory.is_empty());
        assert!(inventory.names().is_empty());
    }
}
