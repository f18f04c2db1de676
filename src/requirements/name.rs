//! Normalized package names.
//!
//! Every set operation in the crate compares packages by [`PackageName`],
//! never by the raw string, so `Foo_Bar`, `foo.bar` and `foo-bar` are the
//! same package everywhere.

use std::fmt;

/// A package name normalized for comparison.
///
/// Lowercased, with every run of `-`, `_` and `.` collapsed to a single `-`.
///
/// # Example
///
/// ```
/// use venv_update::requirements::PackageName;
///
/// assert_eq!(PackageName::new("Foo_Bar"), PackageName::new("foo-bar"));
/// assert_eq!(PackageName::new("zope.interface").as_str(), "zope-interface");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageName(String);

impl PackageName {
    /// Normalize a raw distribution name.
    pub fn new(raw: &str) -> Self {
        let mut normalized = String::with_capacity(raw.len());
        let mut pending_separator = false;
        for ch in raw.trim().chars() {
            if matches!(ch, '-' | '_' | '.') {
                pending_separator = true;
                continue;
            }
            if pending_separator && !normalized.is_empty() {
                normalized.push('-');
            }
            pending_separator = false;
            normalized.extend(ch.to_lowercase());
        }
        Self(normalized)
    }

    /// The normalized form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_and_case_are_normalized() {
        assert_eq!(PackageName::new("Foo_Bar").as_str(), "foo-bar");
        assert_eq!(PackageName::new("foo.bar").as_str(), "foo-bar");
        assert_eq!(PackageName::new("FOO-BAR"), PackageName::new("foo_bar"));
    }

    #[test]
    fn separator_runs_collapse() {
        assert_eq!(PackageName::new("a-_.b").as_str(), "a-b");
    }

    #[test]
    fn trailing_separators_are_dropped() {
        assert_eq!(PackageName::new("pkg_").as_str(), "pkg");
        assert_eq!(PackageName::new("  Django ").as_str(), "django");
    }
}
