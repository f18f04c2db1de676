//! Child process execution.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Result, VenvUpdateError};
use crate::ui::Output;

use super::quote::command_line;
use super::signal;

/// Result of running a child process.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// The command as it was echoed.
    pub command: String,

    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Terminating signal, if any.
    pub signal: Option<i32>,

    /// Standard output, when captured.
    pub stdout: String,

    /// Standard error, when captured.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    fn from_status(
        command: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            command,
            exit_code: status.code(),
            signal: terminating_signal(&status),
            stdout,
            stderr,
            duration,
            success: status.success(),
        }
    }

    /// Turn a failed or interrupted run into an error.
    ///
    /// A child killed by a signal, or any child that ends after the user
    /// pressed Ctrl-C, is [`VenvUpdateError::Interrupted`].
    pub fn check(self) -> Result<Self> {
        if self.signal.is_some() || signal::interrupted() {
            return Err(VenvUpdateError::Interrupted);
        }
        if !self.success {
            return Err(VenvUpdateError::InstallerFailed {
                command: self.command,
                code: self.exit_code.unwrap_or(1),
            });
        }
        Ok(self)
    }
}

#[cfg(unix)]
fn terminating_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with the inherited environment).
    pub env: HashMap<String, OsString>,

    /// Environment variables to drop from the inherited environment.
    pub env_remove: Vec<String>,

    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,

    /// Echo the command line before running it.
    pub echo: bool,
}

/// Identifies a process started by a [`ProcessTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessId(u64);

#[derive(Debug)]
struct TrackedProcess {
    id: ProcessId,
    command: String,
    started: Instant,
    child: Child,
    stdout: Option<JoinHandle<String>>,
    stderr: Option<JoinHandle<String>>,
}

/// Owns every child process this run has started.
///
/// A child stays registered until it has been waited on, so a failure
/// handler can always reap whatever is still running before it touches
/// the environment.
#[derive(Debug, Default)]
pub struct ProcessTracker {
    running: Vec<TrackedProcess>,
    next_id: u64,
    output: Output,
}

impl ProcessTracker {
    pub fn new(output: Output) -> Self {
        Self {
            running: Vec::new(),
            next_id: 0,
            output,
        }
    }

    /// Start `program` and register it.
    pub fn spawn<S: AsRef<OsStr>>(
        &mut self,
        program: impl AsRef<OsStr>,
        args: &[S],
        options: &CommandOptions,
    ) -> Result<ProcessId> {
        let program = program.as_ref();
        let line = command_line(program, args);
        if options.echo {
            self.output.command(&line);
        }
        tracing::debug!("Running: {}", line);

        let mut cmd = Command::new(program);
        cmd.args(args);

        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        for key in &options.env_remove {
            cmd.env_remove(key);
        }
        for (key, value) in &options.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::inherit());
        cmd.stdout(if options.capture_stdout {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
        cmd.stderr(if options.capture_stderr {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });

        let mut child = cmd.spawn().map_err(|source| VenvUpdateError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;

        let stdout = child.stdout.take().map(collect);
        let stderr = child.stderr.take().map(collect);

        let id = ProcessId(self.next_id);
        self.next_id += 1;
        self.running.push(TrackedProcess {
            id,
            command: line,
            started: Instant::now(),
            child,
            stdout,
            stderr,
        });
        Ok(id)
    }

    /// Wait for a registered process and unregister it.
    ///
    /// If waiting fails the process stays registered for
    /// [`wait_all`](Self::wait_all).
    pub fn wait(&mut self, id: ProcessId) -> Result<CommandResult> {
        let index = self
            .running
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| anyhow::anyhow!("process {:?} is not running", id))?;

        let status = self.running[index].child.wait()?;
        let process = self.running.remove(index);

        let stdout = process
            .stdout
            .map(|h| h.join().unwrap_or_default())
            .unwrap_or_default();
        let stderr = process
            .stderr
            .map(|h| h.join().unwrap_or_default())
            .unwrap_or_default();

        let result = CommandResult::from_status(
            process.command,
            status,
            stdout,
            stderr,
            process.started.elapsed(),
        );
        tracing::debug!(
            "{} finished with {:?} in {:?}",
            result.command,
            result.exit_code,
            result.duration
        );
        Ok(result)
    }

    /// Spawn and wait in one step.
    pub fn execute<S: AsRef<OsStr>>(
        &mut self,
        program: impl AsRef<OsStr>,
        args: &[S],
        options: &CommandOptions,
    ) -> Result<CommandResult> {
        let id = self.spawn(program, args, options)?;
        self.wait(id)
    }

    /// Number of processes not yet waited on.
    pub fn running(&self) -> usize {
        self.running.len()
    }

    /// Wait for every registered process. Returns how many were reaped.
    pub fn wait_all(&mut self) -> usize {
        let mut reaped = 0;
        for mut process in self.running.drain(..) {
            match process.child.wait() {
                Ok(status) => {
                    tracing::debug!("Reaped {}: {}", process.command, status);
                    reaped += 1;
                }
                Err(err) => {
                    tracing::warn!("Could not wait for {}: {}", process.command, err);
                }
            }
        }
        reaped
    }
}

fn collect<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}
