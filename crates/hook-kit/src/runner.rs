//! Bounded-time child process execution
//!
//! The validator only needs "run this with this stdin, give up after this long".
//! [`ProcessRunner`] is that seam; [`SystemRunner`] is the real implementation and
//! any closure with the same signature works as a stub in tests.

use crate::error::RunError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Program, arguments, extra environment and working directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path
    pub program: String,
    /// Arguments after the program
    pub args: Vec<String>,
    /// Variables added to the inherited environment
    pub env: BTreeMap<String, String>,
    /// Working directory, inherited when `None`
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Command with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set one environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

/// A child that exited normally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit code
    pub code: i32,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

/// Runs a command with stdin input and a hard wall-clock bound.
pub trait ProcessRunner {
    /// Run `cmd`, feed it `input`, and wait at most `timeout`.
    fn run_with_timeout(
        &self,
        cmd: &CommandSpec,
        input: &[u8],
        timeout: Duration,
    ) -> Result<ExitOutcome, RunError>;
}

impl<F> ProcessRunner for F
where
    F: Fn(&CommandSpec, &[u8], Duration) -> Result<ExitOutcome, RunError>,
{
    fn run_with_timeout(
        &self,
        cmd: &CommandSpec,
        input: &[u8],
        timeout: Duration,
    ) -> Result<ExitOutcome, RunError> {
        self(cmd, input, timeout)
    }
}

/// Spawns real processes through tokio on a private current-thread runtime.
///
/// The run ends when stdout and stderr close, not when the child exits. A
/// script that leaves a background job holding its output open counts as a
/// timeout, and only the direct child is killed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run_with_timeout(
        &self,
        cmd: &CommandSpec,
        input: &[u8],
        timeout: Duration,
    ) -> Result<ExitOutcome, RunError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
            .map_err(RunError::Io)?;
        runtime.block_on(run_child(cmd, input, timeout))
    }
}

async fn run_child(
    cmd: &CommandSpec,
    input: &[u8],
    timeout: Duration,
) -> Result<ExitOutcome, RunError> {
    let mut command = tokio::process::Command::new(&cmd.program);
    command
        .args(&cmd.args)
        .envs(&cmd.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &cmd.cwd {
        command.current_dir(dir);
    }

    log::debug!("Spawning {} {:?}", cmd.program, cmd.args);
    let mut child = command.spawn().map_err(|source| RunError::Spawn {
        program: cmd.program.clone(),
        source,
    })?;

    let stdin = child.stdin.take();
    let exchange = async move {
        if let Some(mut stdin) = stdin {
            // A child that exits without reading stdin closes the pipe early.
            match stdin.write_all(input).await {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                    return Err(RunError::Io(e))
                }
                _ => {}
            }
            drop(stdin);
        }
        child.wait_with_output().await.map_err(RunError::Io)
    };

    let output = match tokio::time::timeout(timeout, exchange).await {
        Ok(result) => result?,
        Err(_) => {
            log::debug!("{} exceeded {:?}, killed", cmd.program, timeout);
            return Err(RunError::Timeout { after: timeout });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    match output.status.code() {
        Some(code) => Ok(ExitOutcome {
            code,
            stdout,
            stderr,
        }),
        None => Err(RunError::Crashed {
            signal: exit_signal(&output.status),
            stderr,
        }),
    }
}

#[cfg(unix)]
fn exit_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}
