//! The environment's own `pip`.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::CacheConfig;
use crate::environment::Environment;
use crate::error::Result;
use crate::inventory::InstalledPackage;
use crate::requirements::PackageName;
use crate::shell::{CommandOptions, ProcessTracker};

use super::report::read_report;
use super::{InstallRequest, Installer, WheelRequest};

/// Runs `<env>/bin/pip` through the process tracker.
#[derive(Debug)]
pub struct PipInstaller<'a> {
    pip: PathBuf,
    cache: CacheConfig,
    index_url: Option<String>,
    tracker: &'a mut ProcessTracker,
}

impl<'a> PipInstaller<'a> {
    pub fn new(
        env: &Environment,
        cache: CacheConfig,
        index_url: Option<String>,
        tracker: &'a mut ProcessTracker,
    ) -> Self {
        Self {
            pip: env.pip(),
            cache,
            index_url,
            tracker,
        }
    }

    fn run(&mut self, args: Vec<OsString>) -> Result<()> {
        let options = CommandOptions {
            echo: true,
            ..Default::default()
        };
        self.tracker.execute(&self.pip, &args, &options)?.check()?;
        Ok(())
    }

    fn cache_args(&self) -> Vec<OsString> {
        vec![flag("--cache-dir=", &self.cache.download_cache)]
    }

    fn index_args(&self) -> Vec<OsString> {
        self.index_url
            .iter()
            .map(|url| OsString::from(format!("--index-url={url}")))
            .collect()
    }

    fn offline_args(&self) -> Vec<OsString> {
        vec![
            OsString::from("--no-index"),
            flag("--find-links=", &self.cache.wheel_dir),
        ]
    }

    /// Full argument list for an install that writes its report to `report`.
    pub fn install_args(&self, request: &InstallRequest, report: &Path) -> Vec<OsString> {
        let mut args = vec![OsString::from("install")];
        if request.upgrade {
            args.push("--upgrade".into());
        }
        if request.offline {
            args.extend(self.offline_args());
        } else {
            args.extend(self.index_args());
        }
        args.extend(self.cache_args());
        args.push("--report".into());
        args.push(report.as_os_str().to_owned());
        args.extend(requirement_args(&request.packages, &request.requirement_files));
        args
    }

    /// Full argument list for a wheel build.
    pub fn wheel_args(&self, request: &WheelRequest) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("wheel"),
            flag("--wheel-dir=", &self.cache.wheel_dir),
            flag("--find-links=", &self.cache.wheel_dir),
        ];
        args.extend(self.index_args());
        args.extend(self.cache_args());
        args.extend(requirement_args(&request.packages, &request.requirement_files));
        args
    }
}

impl Installer for PipInstaller<'_> {
    fn install(&mut self, request: &InstallRequest) -> Result<Vec<InstalledPackage>> {
        let report = tempfile::Builder::new()
            .prefix("venv-update-report-")
            .suffix(".json")
            .tempfile()?;

        let args = self.install_args(request, report.path());
        self.run(args)?;
        let installed = read_report(report.path())?;
        tracing::debug!("Installer placed {} package(s)", installed.len());
        Ok(installed)
    }

    fn wheel(&mut self, request: &WheelRequest) -> Result<()> {
        std::fs::create_dir_all(&self.cache.wheel_dir)?;
        let args = self.wheel_args(request);
        self.run(args)
    }

    fn uninstall(&mut self, names: &BTreeSet<PackageName>) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        let mut args = vec![OsString::from("uninstall"), OsString::from("--yes")];
        args.extend(names.iter().map(|name| OsString::from(name.as_str())));
        self.run(args)
    }
}

fn flag(prefix: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(path.as_os_str());
    arg
}

fn requirement_args(packages: &[String], files: &[PathBuf]) -> Vec<OsString> {
    let mut args: Vec<OsString> = packages.iter().map(OsString::from).collect();
    for file in files {
        args.push("-r".into());
        args.push(file.as_os_str().to_owned());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::BOOTSTRAP;
    use crate::requirements::RequirementEntry;
    use crate::ui::{Output, Theme};

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    fn installer<'a>(tracker: &'a mut ProcessTracker, index: Option<&str>) -> PipInstaller<'a> {
        PipInstaller::new(
            &Environment::new("/venv"),
            CacheConfig::from_root("/c"),
            index.map(str::to_string),
            tracker,
        )
    }

    fn tracker() -> ProcessTracker {
        ProcessTracker::new(Output::new(Theme::plain()))
    }

    #[test]
    fn bootstrap_install_upgrades_through_index() {
        let mut tracker = tracker();
        let pip = installer(&mut tracker, Some("https://idx.test/simple"));

        let args = strings(&pip.install_args(&InstallRequest::bootstrap(), Path::new("/tmp/r.json")));

        assert_eq!(
            args,
            [
                "install",
                "--upgrade",
                "--index-url=https://idx.test/simple",
                "--cache-dir=/c/cache",
                "--report",
                "/tmp/r.json",
                BOOTSTRAP[0],
            ]
        );
    }

    #[test]
    fn cache_install_never_touches_index() {
        let mut tracker = tracker();
        let pip = installer(&mut tracker, Some("https://idx.test/simple"));
        let request = InstallRequest::from_cache(
            vec![PathBuf::from("requirements.txt")],
            vec![RequirementEntry::named("six")],
        );

        let args = strings(&pip.install_args(&request, Path::new("/tmp/r.json")));

        assert_eq!(
            args,
            [
                "install",
                "--no-index",
                "--find-links=/c/wheelhouse",
                "--cache-dir=/c/cache",
                "--report",
                "/tmp/r.json",
                "-r",
                "requirements.txt",
            ]
        );
    }

    #[test]
    fn wheel_build_targets_wheelhouse() {
        let mut tracker = tracker();
        let pip = installer(&mut tracker, None);
        let request = WheelRequest::populate(
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")],
            Vec::new(),
        );

        let args = strings(&pip.wheel_args(&request));

        assert_eq!(
            args,
            [
                "wheel",
                "--wheel-dir=/c/wheelhouse",
                "--find-links=/c/wheelhouse",
                "--cache-dir=/c/cache",
                BOOTSTRAP[0],
                "-r",
                "a.txt",
                "-r",
                "b.txt",
            ]
        );
    }

    #[test]
    fn empty_uninstall_runs_nothing() {
        let mut tracker = tracker();
        let mut pip = installer(&mut tracker, None);
        pip.uninstall(&BTreeSet::new()).unwrap();
    }
}
