//! Run configuration.
//!
//! Everything a run needs is resolved once at startup into [`Settings`]
//! and passed down explicitly:
//! - [`CacheConfig`] - Where downloads and built wheels are kept
//! - [`Stage`] - Which half of the two-stage run this process is
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use venv_update::config::CacheConfig;
//!
//! let cache = CacheConfig::from_root("/home/dev/.pip");
//! assert_eq!(cache.wheel_dir, Path::new("/home/dev/.pip/wheelhouse"));
//! assert_eq!(cache.download_cache, Path::new("/home/dev/.pip/cache"));
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::environment::Environment;
use crate::error::Result;

/// Cache locations shared by every installer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Downloaded source archives and HTTP cache.
    pub download_cache: PathBuf,
    /// Built wheels, also the only source for offline installs.
    pub wheel_dir: PathBuf,
}

impl CacheConfig {
    /// Lay out the cache under `root`.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            download_cache: root.join("cache"),
            wheel_dir: root.join("wheelhouse"),
        }
    }

    /// Use `root` if given, else `~/.pip`.
    pub fn resolve(root: Option<&Path>) -> Result<Self> {
        if let Some(root) = root {
            return Ok(Self::from_root(root));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("cannot determine home directory for the cache"))?;
        Ok(Self::from_root(home.join(".pip")))
    }

    /// The root both directories live under.
    pub fn root(&self) -> &Path {
        self.wheel_dir.parent().unwrap_or(&self.wheel_dir)
    }
}

/// Which half of the run this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Invoked by the user; prepares the environment and re-executes.
    One,
    /// Re-executed inside the activated environment; installs.
    Two,
}

/// The resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub requirement_files: Vec<PathBuf>,
    pub creator: OsString,
    pub creator_args: Vec<OsString>,
    pub index_url: Option<String>,
    pub cache: CacheConfig,
    pub stage: Stage,
    pub debug: bool,
}

impl Settings {
    /// Resolve settings from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Self {
            environment: Environment::new(&cli.virtualenv_dir),
            requirement_files: cli.requirements.clone(),
            creator: cli.virtualenv.clone(),
            creator_args: cli.creator_args.clone(),
            index_url: cli.index_url.clone().filter(|url| !url.is_empty()),
            cache: CacheConfig::resolve(cli.cache_dir.as_deref())?,
            stage: if cli.stage2 { Stage::Two } else { Stage::One },
            debug: cli.debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cache_layout_under_root() {
        let cache = CacheConfig::from_root("/c");
        assert_eq!(cache.download_cache, PathBuf::from("/c/cache"));
        assert_eq!(cache.wheel_dir, PathBuf::from("/c/wheelhouse"));
        assert_eq!(cache.root(), Path::new("/c"));
    }

    #[test]
    fn explicit_cache_root_wins() {
        let cache = CacheConfig::resolve(Some(Path::new("/override"))).unwrap();
        assert_eq!(cache, CacheConfig::from_root("/override"));
    }

    #[test]
    fn default_cache_lives_in_home() {
        if let Some(home) = dirs::home_dir() {
            let cache = CacheConfig::resolve(None).unwrap();
            assert_eq!(cache.wheel_dir, home.join(".pip").join("wheelhouse"));
        }
    }

    #[test]
    fn settings_from_cli() {
        let cli = Cli::try_parse_from([
            "venv-update",
            "--cache-dir",
            "/tmp/cache",
            "--stage2",
            "venv",
            "reqs.txt",
        ])
        .unwrap();

        let settings = Settings::from_cli(&cli).unwrap();

        assert_eq!(settings.environment.root(), Path::new("venv"));
        assert_eq!(settings.requirement_files, [PathBuf::from("reqs.txt")]);
        assert_eq!(settings.cache, CacheConfig::from_root("/tmp/cache"));
        assert_eq!(settings.stage, Stage::Two);
    }

    #[test]
    fn empty_index_url_is_ignored() {
        let cli = Cli::try_parse_from(["venv-update", "--index-url", "", "--cache-dir", "/c"])
            .unwrap();
        assert_eq!(Settings::from_cli(&cli).unwrap().index_url, None);
    }
}
