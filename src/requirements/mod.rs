//! Requirement declarations.
//!
//! This module turns requirement files into normalized entries that the
//! resolver and the installer share.
//!
//! # Modules
//!
//! - [`name`] - Package name normalization
//! - [`specifier`] - Version specifiers, for conflict detection only
//! - [`entry`] - A single named or located requirement
//! - [`loader`] - Requirement file parsing

pub mod entry;
pub mod loader;
pub mod name;
pub mod specifier;

pub use entry::{Marker, RequirementEntry, Source};
pub use loader::{load_requirement_files, parse_requirements};
pub use name::PackageName;
pub use specifier::{SpecifierSet, Version};
