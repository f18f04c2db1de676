//! Marking a failed environment as stale.
//!
//! Nothing is rolled back. The environment directory's timestamps are
//! moved behind its requirement files, so a build system that compares
//! them (make, for one) rebuilds it next time.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use filetime::FileTime;

use crate::environment::Environment;
use crate::error::Result;
use crate::shell::ProcessTracker;
use crate::ui::Output;

const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// One day before the oldest existing requirement file, or before now if
/// none exist.
pub fn backdate_target(requirement_files: &[PathBuf]) -> SystemTime {
    let oldest = requirement_files
        .iter()
        .filter_map(|file| std::fs::metadata(file).and_then(|m| m.modified()).ok())
        .min()
        .unwrap_or_else(SystemTime::now);
    oldest.checked_sub(ONE_DAY).unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Reap every outstanding child, then backdate `env`.
///
/// Returns the time the directory was set to, or `None` if there was no
/// directory to mark.
pub fn invalidate(
    env: &Environment,
    requirement_files: &[PathBuf],
    tracker: &mut ProcessTracker,
    output: &Output,
) -> Result<Option<SystemTime>> {
    if !env.exists() {
        tracing::debug!("{} does not exist; nothing to invalidate", env.root().display());
        return Ok(None);
    }

    if tracker.running() > 0 {
        output.println("Waiting for all subprocesses to finish...");
    }
    tracker.wait_all();

    let target = backdate_target(requirement_files);
    let stamp = FileTime::from_system_time(target);
    filetime::set_file_times(env.root(), stamp, stamp)?;

    output.invalidation(env.root(), DateTime::<Local>::from(target));
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Theme;
    use std::fs;
    use tempfile::TempDir;

    fn tracker() -> ProcessTracker {
        ProcessTracker::new(Output::new(Theme::plain()))
    }

    fn mtime(path: &std::path::Path) -> SystemTime {
        fs::metadata(path).unwrap().modified().unwrap()
    }

    #[test]
    fn env_ends_up_older_than_every_requirement_file() {
        let temp = TempDir::new().unwrap();
        let reqs = vec![temp.path().join("a.txt"), temp.path().join("b.txt")];
        for req in &reqs {
            fs::write(req, "six\n").unwrap();
        }
        let old = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&reqs[1], old).unwrap();

        let env = Environment::new(temp.path().join("venv"));
        fs::create_dir_all(env.root()).unwrap();

        let output = Output::new(Theme::plain());
        let set_to = invalidate(&env, &reqs, &mut tracker(), &output)
            .unwrap()
            .unwrap();

        let env_mtime = mtime(env.root());
        assert_eq!(env_mtime, set_to);
        for req in &reqs {
            assert!(env_mtime < mtime(req));
        }
    }

    #[test]
    fn missing_requirement_files_fall_back_to_now() {
        let before = SystemTime::now();
        let target = backdate_target(&[PathBuf::from("/definitely/not/here.txt")]);
        assert!(target < before);
        assert!(before.duration_since(target).unwrap() >= ONE_DAY);
    }

    #[test]
    fn missing_environment_is_left_alone() {
        let temp = TempDir::new().unwrap();
        let env = Environment::new(temp.path().join("venv"));
        let output = Output::new(Theme::plain());

        let result = invalidate(&env, &[], &mut tracker(), &output).unwrap();

        assert!(result.is_none());
        assert!(!env.exists());
    }

    #[cfg(unix)]
    #[test]
    fn outstanding_children_are_reaped_first() {
        use crate::shell::CommandOptions;

        let temp = TempDir::new().unwrap();
        let env = Environment::new(temp.path().join("venv"));
        fs::create_dir_all(env.root()).unwrap();

        let mut tracker = tracker();
        tracker
            .spawn("sh", &["-c", "sleep 0.1"], &CommandOptions::default())
            .unwrap();
        let output = Output::new(Theme::plain());

        invalidate(&env, &[], &mut tracker, &output).unwrap();

        assert_eq!(tracker.running(), 0);
    }
}
