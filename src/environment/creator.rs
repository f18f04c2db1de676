//! Creating an environment when it is missing.

use std::ffi::OsString;

use crate::error::{Result, VenvUpdateError};
use crate::shell::{interrupted, CommandOptions, ProcessTracker};

use super::Environment;

/// Something that can build an empty environment at a path.
pub trait EnvironmentCreator {
    /// Create (or repair) `env`. Blocks until done.
    fn create(&self, env: &Environment, tracker: &mut ProcessTracker) -> Result<()>;
}

/// Runs `<program> <dir> <args...>`, `virtualenv` by default.
#[derive(Debug, Clone)]
pub struct Virtualenv {
    program: OsString,
    args: Vec<OsString>,
}

impl Virtualenv {
    pub fn new(program: impl Into<OsString>, args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Default for Virtualenv {
    fn default() -> Self {
        Self::new("virtualenv", Vec::new())
    }
}

impl EnvironmentCreator for Virtualenv {
    fn create(&self, env: &Environment, tracker: &mut ProcessTracker) -> Result<()> {
        let mut argv = vec![env.root().as_os_str().to_owned()];
        argv.extend(self.args.iter().cloned());

        let options = CommandOptions {
            echo: true,
            ..Default::default()
        };
        let result = tracker.execute(&self.program, &argv, &options)?;

        if result.signal.is_some() || interrupted() {
            return Err(VenvUpdateError::Interrupted);
        }
        if !result.success {
            return Err(VenvUpdateError::CreatorFailed {
                path: env.root().to_path_buf(),
                code: result.exit_code,
            });
        }
        Ok(())
    }
}

/// Make sure `env` has an interpreter and an installer.
///
/// Returns whether the creator ran. A half-present directory is handed to
/// the creator as-is.
pub fn ensure_environment(
    env: &Environment,
    creator: &dyn EnvironmentCreator,
    tracker: &mut ProcessTracker,
) -> Result<bool> {
    if env.is_populated() {
        tracing::debug!("Environment {} already exists", env.root().display());
        return Ok(false);
    }

    tracing::info!("Creating environment at {}", env.root().display());
    creator.create(env, tracker)?;

    if !env.is_populated() {
        return Err(anyhow::anyhow!(
            "environment creator finished but {} is missing",
            env.python().display()
        )
        .into());
    }
    Ok(true)
}
