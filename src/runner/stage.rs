//! Moving from the invoking process into the target environment.
//!
//! Stage 1 never installs anything itself. It starts a second copy of this
//! program with the environment activated on that child's command only,
//! and stage 2 refuses to run anywhere else.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::Settings;
use crate::environment::Environment;
use crate::error::{Result, VenvUpdateError};
use crate::shell::{interrupted, CommandOptions, ProcessTracker};

/// Command options that activate `env` for one child process.
pub fn activated(env: &Environment) -> CommandOptions {
    let mut options = CommandOptions {
        echo: true,
        env_remove: vec!["PYTHONHOME".to_string()],
        ..Default::default()
    };

    let root = std::path::absolute(env.root()).unwrap_or_else(|_| env.root().to_path_buf());
    let bin = Environment::new(&root).bin_dir();

    let mut paths = vec![bin];
    if let Some(existing) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&existing));
    }
    let path = std::env::join_paths(paths).unwrap_or_default();

    options
        .env
        .insert("VIRTUAL_ENV".to_string(), root.into_os_string());
    options.env.insert("PATH".to_string(), path);
    options
}

/// Arguments that make a re-executed copy of this program run stage 2
/// with the same configuration.
pub fn stage2_args(settings: &Settings) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--stage2".into(),
        "--cache-dir".into(),
        settings.cache.root().as_os_str().to_owned(),
    ];
    if let Some(url) = &settings.index_url {
        args.push("--index-url".into());
        args.push(url.into());
    }
    if settings.debug {
        args.push("--debug".into());
    }
    args.push(settings.environment.root().as_os_str().to_owned());
    args.extend(
        settings
            .requirement_files
            .iter()
            .map(|file| file.as_os_str().to_owned()),
    );
    args
}

/// Run stage 2 as a child of this process and wait for it.
pub fn reexec(settings: &Settings, tracker: &mut ProcessTracker) -> Result<()> {
    let exe = std::env::current_exe()?;
    let result = tracker.execute(
        exe,
        &stage2_args(settings),
        &activated(&settings.environment),
    )?;

    if result.signal.is_some() || interrupted() {
        return Err(VenvUpdateError::Interrupted);
    }
    if !result.success {
        return Err(VenvUpdateError::Stage2Failed {
            code: result.exit_code.unwrap_or(1),
        });
    }
    Ok(())
}

/// Check that this process runs inside `env`.
pub fn verify_stage2(env: &Environment) -> Result<()> {
    let active = std::env::var_os("VIRTUAL_ENV").map(PathBuf::from);
    let wrong = || VenvUpdateError::WrongEnvironment {
        expected: env.root().to_path_buf(),
        active: active.clone(),
    };

    let Some(active_root) = active.as_deref() else {
        return Err(wrong());
    };
    let same = match (active_root.canonicalize(), env.root().canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if !same || !env.python().is_file() {
        return Err(wrong());
    }
    Ok(())
}
