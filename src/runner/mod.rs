//! Run orchestration.
//!
//! - [`stage`] - Re-executing inside the target environment
//! - [`workflow`] - The stage 2 install sequence
//! - [`invalidate`] - Marking a failed environment as stale
//!
//! Only the outermost process (stage 1) decides whether to invalidate;
//! stage 2 reports its own failure and exits with its code.

pub mod invalidate;
pub mod stage;
pub mod workflow;

use std::panic::{self, AssertUnwindSafe};

use crate::config::{Settings, Stage};
use crate::environment::{ensure_environment, Virtualenv};
use crate::error::{Result, VenvUpdateError};
use crate::installer::{CacheFirst, PipInstaller};
use crate::requirements::load_requirement_files;
use crate::shell::ProcessTracker;
use crate::ui::Output;

pub use invalidate::{backdate_target, invalidate};
pub use stage::{activated, reexec, stage2_args, verify_stage2};
pub use workflow::{InstallWorkflow, RunReport};

/// Run whichever stage `settings` names. Returns the process exit code.
pub fn run(settings: &Settings, output: &Output) -> i32 {
    match settings.stage {
        Stage::One => run_stage1(settings, output),
        Stage::Two => run_stage2(settings, output),
    }
}

fn run_stage1(settings: &Settings, output: &Output) -> i32 {
    run_stage1_with(settings, output, stage1)
}

fn run_stage1_with<F>(settings: &Settings, output: &Output, stage: F) -> i32
where
    F: FnOnce(&Settings, &mut ProcessTracker) -> Result<()>,
{
    let mut tracker = ProcessTracker::new(output.clone());
    let Err(err) = catch_panic(|| stage(settings, &mut tracker)) else {
        return 0;
    };

    // Stage 2 has already printed its own diagnostic.
    if !matches!(err, VenvUpdateError::Stage2Failed { .. }) {
        output.error(&err.to_string());
    }
    tracing::debug!("Stage 1 failed: {:?}", err);

    if let Err(invalidate_err) = invalidate(
        &settings.environment,
        &settings.requirement_files,
        &mut tracker,
        output,
    ) {
        output.error(&format!("Could not invalidate environment: {invalidate_err}"));
    }
    err.exit_code()
}

/// Turn a panic into an error so the environment still gets invalidated.
fn catch_panic<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(anyhow::anyhow!("Internal error: {message}").into())
    })
}

fn stage1(settings: &Settings, tracker: &mut ProcessTracker) -> Result<()> {
    // Fail on malformed requirement files before touching anything.
    load_requirement_files(&settings.requirement_files)?;

    let creator = Virtualenv::new(settings.creator.clone(), settings.creator_args.clone());
    ensure_environment(&settings.environment, &creator, tracker)?;

    reexec(settings, tracker)
}

fn run_stage2(settings: &Settings, output: &Output) -> i32 {
    let mut tracker = ProcessTracker::new(output.clone());
    match stage2(settings, &mut tracker) {
        Ok(report) => {
            report.log_summary();
            0
        }
        Err(err) => {
            output.error(&err.to_string());
            tracker.wait_all();
            err.exit_code()
        }
    }
}

fn stage2(settings: &Settings, tracker: &mut ProcessTracker) -> Result<RunReport> {
    let env = &settings.environment;
    verify_stage2(env)?;

    let entries = load_requirement_files(&settings.requirement_files)?;
    tracing::debug!("Loaded {} requirement(s)", entries.len());

    let pip = PipInstaller::new(env, settings.cache.clone(), settings.index_url.clone(), tracker);
    let mut installer = CacheFirst::new(pip, &settings.cache.wheel_dir);

    InstallWorkflow::new(settings.requirement_files.clone(), entries)
        .run(&env.site_packages(), &mut installer)
}
