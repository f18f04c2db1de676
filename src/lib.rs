//! venv-update - Keep a Python virtualenv in sync with its requirement files.
//!
//! A run creates the environment if needed, installs everything the
//! requirement files ask for through a local wheel cache, and then removes
//! every installed package that is no longer needed, directly or
//! transitively. Any failure backdates the environment directory so build
//! tools treat it as stale.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Resolved run settings and cache layout
//! - [`environment`] - Environment layout and creation
//! - [`error`] - Error types and result aliases
//! - [`installer`] - The package installer and its cache-first adapter
//! - [`inventory`] - Snapshots of installed packages
//! - [`reconcile`] - Computing the uninstall set
//! - [`requirements`] - Requirement file loading and parsing
//! - [`resolver`] - Transitive closure over installed packages
//! - [`runner`] - Two-stage orchestration and invalidation
//! - [`shell`] - Child process execution
//! - [`ui`] - Terminal output and styling
//!
//! # Example
//!
//! ```
//! use venv_update::inventory::{InstalledDistribution, Inventory};
//! use venv_update::reconcile::{protected_names, reconcile};
//! use venv_update::requirements::RequirementEntry;
//! use venv_update::resolver::resolve;
//!
//! let inventory = Inventory::from_distributions([
//!     InstalledDistribution::new("A", "1", vec![RequirementEntry::named("B")]),
//!     InstalledDistribution::new("B", "1", vec![]),
//!     InstalledDistribution::new("C", "1", vec![]),
//! ]);
//! let required = resolve(&[RequirementEntry::named("A")], &inventory).unwrap();
//!
//! let uninstall = reconcile(
//!     &inventory.names(),
//!     &required.names(),
//!     &Default::default(),
//!     &protected_names(),
//! );
//! assert_eq!(uninstall.len(), 1);
//! assert!(uninstall.iter().all(|name| name.as_str() == "c"));
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod installer;
pub mod inventory;
pub mod reconcile;
pub mod requirements;
pub mod resolver;
pub mod runner;
pub mod shell;
pub mod ui;

pub use error::{Result, VenvUpdateError};
