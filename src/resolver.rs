//! Transitive dependency resolution over the installed-package graph.
//!
//! The closure answers one question: which installed packages are still
//! needed by the requirement files? It only ever reasons about what is
//! installed right now, never about what an install would bring in.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::{Result, VenvUpdateError};
use crate::inventory::{InstalledDistribution, InstalledPackage, Inventory};
use crate::requirements::{PackageName, RequirementEntry, Source};

/// An installed version that does not satisfy a requirement on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub installed: InstalledPackage,
    pub requirement: String,
    pub required_by: String,
}

/// The packages reachable from the top-level requirements.
#[derive(Debug, Clone, Default)]
pub struct Closure {
    packages: BTreeMap<PackageName, InstalledPackage>,
    conflicts: Vec<Conflict>,
}

impl Closure {
    pub fn contains(&self, name: &PackageName) -> bool {
        self.packages.contains_key(name)
    }

    pub fn names(&self) -> BTreeSet<PackageName> {
        self.packages.keys().cloned().collect()
    }

    pub fn packages(&self) -> BTreeSet<InstalledPackage> {
        self.packages.values().cloned().collect()
    }

    /// Conflicts seen during traversal, one per package name.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

struct Pending {
    entry: RequirementEntry,
    required_by: Option<PackageName>,
}

impl Pending {
    fn requirer(&self) -> String {
        self.required_by
            .as_ref()
            .map_or_else(|| "requirements file".to_string(), ToString::to_string)
    }
}

/// Walk the installed dependency graph breadth-first from `top_level`.
///
/// - URL/path entries without a name are skipped; they are installed
///   directly and contribute nothing to the named closure.
/// - A named requirement with nothing installed under that name is an
///   [`VenvUpdateError::UnmetDependency`], unless it is guarded by an
///   environment marker (marker evaluation belongs to the installer).
/// - An installed version that does not satisfy a constraint is logged
///   once per name and kept.
/// - A package already in the closure is never expanded again, so cycles
///   terminate. Extras requested later expand only their own
///   dependencies.
pub fn resolve(top_level: &[RequirementEntry], inventory: &Inventory) -> Result<Closure> {
    let mut closure = Closure::default();
    let mut expanded_extras: BTreeMap<PackageName, BTreeSet<String>> = BTreeMap::new();
    let mut warned: BTreeSet<PackageName> = BTreeSet::new();
    let mut queue: VecDeque<Pending> = top_level
        .iter()
        .cloned()
        .map(|entry| Pending {
            entry,
            required_by: None,
        })
        .collect();

    while let Some(pending) = queue.pop_front() {
        let entry = &pending.entry;
        let Some(name) = entry.name.as_ref() else {
            tracing::debug!("Skipping unnamed requirement {}", entry);
            continue;
        };

        let Some(dist) = inventory.get(name) else {
            if entry.source != Source::Named {
                tracing::debug!("{} is not installed yet; it is installed directly", entry);
                continue;
            }
            if entry.marker.as_ref().is_some_and(|m| m.conditional) {
                tracing::debug!("Skipping {}: marker not satisfied in this environment", entry);
                continue;
            }
            return Err(VenvUpdateError::UnmetDependency {
                requirement: entry.raw.clone(),
                required_by: pending.requirer(),
            });
        };

        if !entry.is_satisfied_by(&dist.package.version) && warned.insert(name.clone()) {
            tracing::warn!(
                "Version conflict: {} is installed but {} requires {}",
                dist.package,
                pending.requirer(),
                entry
            );
            closure.conflicts.push(Conflict {
                installed: dist.package.clone(),
                requirement: entry.raw.clone(),
                required_by: pending.requirer(),
            });
        }

        let first_visit = !closure.packages.contains_key(name);
        let seen_extras = expanded_extras.entry(name.clone()).or_default();
        let new_extras: BTreeSet<String> = entry.extras.difference(seen_extras).cloned().collect();
        if !first_visit && new_extras.is_empty() {
            continue;
        }
        seen_extras.extend(new_extras.iter().cloned());

        if first_visit {
            tracing::debug!("Resolved {} via {}", dist.package, pending.requirer());
            closure
                .packages
                .insert(name.clone(), dist.package.clone());
        }

        for dependency in dependencies_to_follow(dist, first_visit, &new_extras) {
            queue.push_back(Pending {
                entry: dependency.clone(),
                required_by: Some(name.clone()),
            });
        }
    }

    Ok(closure)
}

fn dependencies_to_follow<'a>(
    dist: &'a InstalledDistribution,
    include_base: bool,
    extras: &'a BTreeSet<String>,
) -> impl Iterator<Item = &'a RequirementEntry> {
    dist.requires.iter().filter(move |dep| {
        match dep.marker.as_ref().and_then(|m| m.extra.as_ref()) {
            None => include_base,
            Some(extra) => extras.contains(extra),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(name: &str, version: &str, requires: &[&str]) -> InstalledDistribution {
        InstalledDistribution::new(
            name,
            version,
            requires
                .iter()
                .map(|r| RequirementEntry::parse(r).unwrap())
                .collect(),
        )
    }

    fn reqs(lines: &[&str]) -> Vec<RequirementEntry> {
        lines
            .iter()
            .map(|r| RequirementEntry::parse(r).unwrap())
            .collect()
    }

    fn names(closure: &Closure) -> Vec<String> {
        closure.names().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn follows_installed_dependencies() {
        let inventory = Inventory::from_distributions([
            dist("A", "1", &["B"]),
            dist("B", "1", &[]),
            dist("C", "1", &[]),
        ]);

        let closure = resolve(&reqs(&["A"]), &inventory).unwrap();

        assert_eq!(names(&closure), ["a", "b"]);
        assert_eq!(
            closure.packages(),
            BTreeSet::from([InstalledPackage::new("A", "1"), InstalledPackage::new("B", "1")])
        );
    }

    #[test]
    fn cycles_terminate() {
        let inventory =
            Inventory::from_distributions([dist("A", "1", &["B"]), dist("B", "1", &["A"])]);

        let closure = resolve(&reqs(&["A"]), &inventory).unwrap();
        assert_eq!(names(&closure), ["a", "b"]);
    }

    #[test]
    fn self_dependency_terminates() {
        let inventory = Inventory::from_distributions([dist("loop", "1", &["loop"])]);
        let closure = resolve(&reqs(&["loop"]), &inventory).unwrap();
        assert_eq!(closure.len(), 1);
    }

    #[test]
    fn unmet_top_level_requirement_fails() {
        let inventory = Inventory::from_distributions([dist("A", "1", &[])]);

        let err = resolve(&reqs(&["missing"]), &inventory).unwrap_err();
        match err {
            VenvUpdateError::UnmetDependency {
                requirement,
                required_by,
            } => {
                assert_eq!(requirement, "missing");
                assert_eq!(required_by, "requirements file");
            }
            other => panic!("expected unmet dependency, got {other:?}"),
        }
    }

    #[test]
    fn unmet_transitive_requirement_names_parent() {
        let inventory = Inventory::from_distributions([dist("A", "1", &["gone>=2"])]);

        let err = resolve(&reqs(&["A"]), &inventory).unwrap_err();
        assert!(matches!(
            err,
            VenvUpdateError::UnmetDependency { ref required_by, .. } if required_by == "a"
        ));
    }

    #[test]
    fn conflicts_warn_and_keep_installed_version() {
        let inventory = Inventory::from_distributions([dist("A", "1", &[])]);

        let closure = resolve(&reqs(&["A==2"]), &inventory).unwrap();

        assert_eq!(closure.packages(), BTreeSet::from([InstalledPackage::new("A", "1")]));
        assert_eq!(closure.conflicts().len(), 1);
        assert_eq!(closure.conflicts()[0].requirement, "A==2");
    }

    #[test]
    fn conflicts_are_reported_once_per_name() {
        let inventory = Inventory::from_distributions([
            dist("app", "1", &["lib>=2"]),
            dist("tool", "1", &["lib>=3"]),
            dist("lib", "1", &[]),
        ]);

        let closure = resolve(&reqs(&["app", "tool", "lib>=4"]), &inventory).unwrap();

        assert_eq!(closure.conflicts().len(), 1);
        assert_eq!(closure.conflicts()[0].installed.name.as_str(), "lib");
    }

    #[test]
    fn unnamed_locations_are_skipped() {
        let inventory = Inventory::default();
        let closure = resolve(
            &reqs(&["./local/pkg", "https://example.test/pkg.tar.gz"]),
            &inventory,
        )
        .unwrap();
        assert!(closure.is_empty());
    }

    #[test]
    fn named_url_requirement_not_yet_installed_is_skipped() {
        let closure = resolve(
            &reqs(&["git+https://example.test/x.git#egg=x"]),
            &Inventory::default(),
        )
        .unwrap();
        assert!(closure.is_empty());
    }

    #[test]
    fn named_url_requirement_contributes_its_dependencies() {
        let inventory =
            Inventory::from_distributions([dist("x", "0.1", &["six"]), dist("six", "1.16", &[])]);
        let closure = resolve(&reqs(&["git+https://example.test/x.git#egg=x"]), &inventory).unwrap();
        assert_eq!(names(&closure), ["six", "x"]);
    }

    #[test]
    fn extras_are_followed_only_when_requested() {
        let inventory = Inventory::from_distributions([
            dist("requests", "2.31.0", &["idna", "PySocks ; extra == 'socks'"]),
            dist("idna", "3.4", &[]),
            dist("pysocks", "1.7.1", &[]),
        ]);

        let plain = resolve(&reqs(&["requests"]), &inventory).unwrap();
        assert_eq!(names(&plain), ["idna", "requests"]);

        let with_socks = resolve(&reqs(&["requests[socks]"]), &inventory).unwrap();
        assert_eq!(names(&with_socks), ["idna", "pysocks", "requests"]);
    }

    #[test]
    fn extras_requested_later_still_expand() {
        let inventory = Inventory::from_distributions([
            dist("requests", "2.31.0", &["PySocks ; extra == 'socks'"]),
            dist("pysocks", "1.7.1", &[]),
        ]);

        let closure = resolve(&reqs(&["requests", "requests[socks]"]), &inventory).unwrap();
        assert_eq!(names(&closure), ["pysocks", "requests"]);
    }

    #[test]
    fn missing_extra_dependency_is_unmet() {
        let inventory = Inventory::from_distributions([dist(
            "requests",
            "2.31.0",
            &["PySocks ; extra == 'socks'"],
        )]);

        assert!(resolve(&reqs(&["requests[socks]"]), &inventory).is_err());
    }

    #[test]
    fn marker_guarded_dependency_may_be_absent() {
        let inventory = Inventory::from_distributions([dist(
            "click",
            "8.1.7",
            &["colorama ; platform_system == \"Windows\""],
        )]);

        let closure = resolve(&reqs(&["click"]), &inventory).unwrap();
        assert_eq!(names(&closure), ["click"]);
    }

    #[test]
    fn marker_guarded_dependency_is_kept_when_installed() {
        let inventory = Inventory::from_distributions([
            dist("click", "8.1.7", &["colorama ; platform_system == \"Windows\""]),
            dist("colorama", "0.4.6", &[]),
        ]);

        let closure = resolve(&reqs(&["click"]), &inventory).unwrap();
        assert_eq!(names(&closure), ["click", "colorama"]);
    }

    #[test]
    fn closure_contains_every_resolvable_top_level_name() {
        let inventory = Inventory::from_distributions([
            dist("Foo_Bar", "1", &[]),
            dist("baz", "2", &[]),
        ]);
        let top = reqs(&["foo-bar", "BAZ"]);

        let closure = resolve(&top, &inventory).unwrap();
        for entry in &top {
            assert!(closure.contains(entry.name.as_ref().unwrap()));
        }
    }
}
