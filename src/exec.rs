//! Shell command execution with logging.
//!
//! [`SystemExecutor`] is the single choke point through which all shell side
//! effects flow: every command's combined stdout/stderr is appended to the
//! run log file, a non-zero exit raises, and [`Permission::User`] commands
//! are re-targeted at the origin user with a `sudo -u` prefix. Handlers and
//! the privilege helpers only see the [`Executor`] trait, so tests swap in a
//! mock.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use anyhow::{Context as _, Result, bail};

/// Who a command should run as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Run with the privileges of the current (possibly elevated) process.
    Root,
    /// Run as the origin user via a `sudo -u <username>` prefix.
    User,
}

/// Result of an unchecked command execution.
#[derive(Debug)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over command execution used by handlers and privilege helpers.
///
/// Implement this trait to swap in a mock during unit tests. The production
/// implementation is [`SystemExecutor`].
pub trait Executor: Send + Sync {
    /// Run a command, sending combined stdout/stderr to the run log.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be started or exits non-zero.
    fn run(&self, program: &str, args: &[&str], permission: Permission) -> Result<()>;

    /// Run a command with `input` piped to its stdin, output to the run log.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be started or exits non-zero.
    fn run_with_stdin(&self, program: &str, args: &[&str], input: &str) -> Result<()>;

    /// Run a command and capture its output without failing on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error only if the command cannot be started at all.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Check whether a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] that spawns real subprocesses.
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    username: String,
    log_file: PathBuf,
}

impl SystemExecutor {
    /// Create an executor that logs to `log_file` and runs
    /// [`Permission::User`] commands as `username`.
    #[must_use]
    pub const fn new(username: String, log_file: PathBuf) -> Self {
        Self { username, log_file }
    }

    /// Open the run log for appending.
    fn open_log(&self) -> Result<std::fs::File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("failed to open log file {}", self.log_file.display()))
    }
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str], permission: Permission) -> Result<()> {
        let mut argv: Vec<&str> = Vec::with_capacity(args.len() + 4);
        if permission == Permission::User {
            argv.extend(["sudo", "-u", self.username.as_str()]);
        }
        argv.push(program);
        argv.extend_from_slice(args);

        tracing::debug!("exec: {}", argv.join(" "));
        let log = self.open_log()?;
        let (head, tail) = argv
            .split_first()
            .context("empty command line")?;
        let status = Command::new(head)
            .args(tail)
            .stdout(Stdio::from(log.try_clone()?))
            .stderr(Stdio::from(log))
            .status()
            .with_context(|| format!("failed to execute: {head}"))?;
        if !status.success() {
            bail!("{head} failed (exit {})", status.code().unwrap_or(-1));
        }
        Ok(())
    }

    fn run_with_stdin(&self, program: &str, args: &[&str], input: &str) -> Result<()> {
        use std::io::Write as _;

        tracing::debug!("exec (stdin piped): {program} {}", args.join(" "));
        let log = self.open_log()?;
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::from(log.try_clone()?))
            .stderr(Stdio::from(log))
            .spawn()
            .with_context(|| format!("failed to execute: {program}"))?;
        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(input.as_bytes())?;
        }
        let status = child.wait()?;
        if !status.success() {
            bail!("{program} failed (exit {})", status.code().unwrap_or(-1));
        }
        Ok(())
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        tracing::debug!("exec (unchecked): {program} {}", args.join(" "));
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Whether the current process already runs with elevated privileges.
#[must_use]
pub fn is_root() -> bool {
    #[cfg(unix)]
    {
        nix::unistd::Uid::effective().is_root()
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Prepend `sudo` to `argv` unless the process is already root.
///
/// Idempotent with respect to privilege: calling this as root returns the
/// argv unchanged, so commands never end up double-wrapped.
#[must_use]
pub fn sudo_command(mut argv: Vec<String>) -> Vec<String> {
    if !is_root() {
        argv.insert(0, "sudo".to_string());
    }
    argv
}

/// Whether `package` is installed according to `dpkg -l`.
///
/// Matches the `ii  <package> ` listing prefix exactly, so a partial name
/// (e.g. `zsh` vs `zsh-common`) does not produce a false positive.
///
/// # Errors
///
/// Returns an error if `dpkg -l` cannot be run or exits non-zero.
pub fn dpkg_check(executor: &dyn Executor, package: &str) -> Result<bool> {
    let result = executor.run_unchecked("dpkg", &["-l"])?;
    if !result.success {
        bail!("dpkg -l failed (exit {})", result.code.unwrap_or(-1));
    }
    Ok(result.stdout.contains(&format!("ii  {package} ")))
}

/// Whether `command` resolves on PATH.
#[must_use]
pub fn command_check(executor: &dyn Executor, command: &str) -> bool {
    executor.which(command)
}
