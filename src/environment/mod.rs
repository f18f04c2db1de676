//! Target environment layout and creation.
//!
//! - [`Environment`] - Paths inside an environment root
//! - [`creator`] - Creating an environment when it is missing

pub mod creator;

use std::path::{Path, PathBuf};

use crate::inventory::SitePackages;

pub use creator::{ensure_environment, EnvironmentCreator, Virtualenv};

/// An isolated environment rooted at one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    root: PathBuf,
}

impl Environment {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the environment's executables.
    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    /// The environment's interpreter.
    pub fn python(&self) -> PathBuf {
        self.bin_dir().join(executable("python"))
    }

    /// The environment's own installer.
    pub fn pip(&self) -> PathBuf {
        self.bin_dir().join(executable("pip"))
    }

    /// Whether the directory exists at all.
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Whether both the interpreter and the installer are present.
    pub fn is_populated(&self) -> bool {
        self.python().is_file() && self.pip().is_file()
    }

    /// Inventory source over this environment's own packages.
    pub fn site_packages(&self) -> SitePackages {
        SitePackages::new(&self.root)
    }
}

fn executable(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn paths_live_under_bin() {
        let env = Environment::new("/tmp/venv");
        assert_eq!(env.python(), PathBuf::from("/tmp/venv/bin/python"));
        assert_eq!(env.pip(), PathBuf::from("/tmp/venv/bin/pip"));
    }

    #[test]
    fn populated_requires_python_and_pip() {
        let temp = TempDir::new().unwrap();
        let env = Environment::new(temp.path().join("venv"));
        assert!(!env.exists());
        assert!(!env.is_populated());

        fs::create_dir_all(env.bin_dir()).unwrap();
        fs::write(env.python(), "").unwrap();
        assert!(env.exists());
        assert!(!env.is_populated());

        fs::write(env.pip(), "").unwrap();
        assert!(env.is_populated());
    }
}
