//! Desired/actual set reconciliation.

use std::collections::BTreeSet;

use crate::requirements::{PackageName, RequirementEntry};

/// Packages the installer toolchain itself needs. Never uninstalled,
/// whatever the requirement files say.
pub const PROTECTED_PACKAGES: &[&str] = &["pip", "setuptools", "wheel"];

/// The protected set, normalized.
pub fn protected_names() -> BTreeSet<PackageName> {
    PROTECTED_PACKAGES.iter().map(|name| PackageName::new(name)).collect()
}

/// Compute the uninstall set.
///
/// `previously_installed − required − recently_installed − protected`, on
/// normalized names.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use venv_update::reconcile::{protected_names, reconcile};
/// use venv_update::requirements::PackageName;
///
/// let set = |names: &[&str]| names.iter().map(|n| PackageName::new(n)).collect::<BTreeSet<_>>();
/// let uninstall = reconcile(
///     &set(&["a", "b", "c", "pip"]),
///     &set(&["a", "b"]),
///     &set(&[]),
///     &protected_names(),
/// );
/// assert_eq!(uninstall, set(&["c"]));
/// ```
pub fn reconcile(
    previously_installed: &BTreeSet<PackageName>,
    required: &BTreeSet<PackageName>,
    recently_installed: &BTreeSet<PackageName>,
    protected: &BTreeSet<PackageName>,
) -> BTreeSet<PackageName> {
    previously_installed
        .iter()
        .filter(|name| !required.contains(*name))
        .filter(|name| !recently_installed.contains(*name))
        .filter(|name| !protected.contains(*name))
        .cloned()
        .collect()
}

/// What a run does to the environment.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationPlan {
    /// Requirements as handed to the installer.
    pub to_install: Vec<RequirementEntry>,
    /// Names to remove in one uninstall batch.
    pub to_uninstall: BTreeSet<PackageName>,
}

impl ReconciliationPlan {
    /// Build a plan whose uninstall set is [`reconcile`] of the inputs.
    pub fn new(
        to_install: Vec<RequirementEntry>,
        previously_installed: &BTreeSet<PackageName>,
        required: &BTreeSet<PackageName>,
        recently_installed: &BTreeSet<PackageName>,
        protected: &BTreeSet<PackageName>,
    ) -> Self {
        Self {
            to_install,
            to_uninstall: reconcile(previously_installed, required, recently_installed, protected),
        }
    }

    /// Whether an uninstall call is needed at all.
    pub fn needs_uninstall(&self) -> bool {
        !self.to_uninstall.is_empty()
    }
}
