//! Temporary passwordless-sudo grant management.
//!
//! The install driver acquires the grant before a batch of package installs
//! and releases it afterwards; the helpers themselves do not enforce that
//! ordering and install no release-on-exit guard. The grant is a drop file
//! under `/etc/sudoers.d`, i.e. filesystem-persisted state shared by every
//! run of the tool.

use std::path::Path;

use crate::error::PrivilegeError;
use crate::exec::{self, Executor};

/// Path of the temporary sudoers drop file.
pub const SUDOERS_DROP_FILE: &str = "/etc/sudoers.d/tmp";

/// Marker `sudo -l` prints when the passwordless grant is active.
const NOPASSWD_MARKER: &str = "(ALL) NOPASSWD: ALL";

/// Grant `username` passwordless sudo via the drop file.
///
/// A no-op when the process is already running as root.
///
/// # Errors
///
/// Returns an error when writing the drop file fails.
pub fn add_sudo_nopasswd(executor: &dyn Executor, username: &str) -> Result<(), PrivilegeError> {
    if exec::is_root() {
        tracing::info!("already running with superuser privileges, no grant needed");
        return Ok(());
    }
    let line = format!("{username} ALL=(ALL) NOPASSWD: ALL\n");
    executor
        .run_with_stdin("sudo", &["tee", SUDOERS_DROP_FILE], &line)
        .map_err(|e| PrivilegeError::GrantFailed(e.to_string()))?;
    tracing::info!("added {SUDOERS_DROP_FILE}");
    Ok(())
}

/// Whether the passwordless grant is currently active, per `sudo -l`.
///
/// # Errors
///
/// Returns an error when `sudo -l` cannot be run or exits non-zero.
pub fn check_sudo_nopasswd(executor: &dyn Executor) -> Result<bool, PrivilegeError> {
    let result = executor
        .run_unchecked("sudo", &["-l"])
        .map_err(|e| PrivilegeError::CheckFailed(e.to_string()))?;
    if !result.success {
        return Err(PrivilegeError::CheckFailed(format!(
            "sudo -l exited {}",
            result.code.unwrap_or(-1)
        )));
    }
    Ok(result.stdout.contains(NOPASSWD_MARKER))
}

/// Remove the sudoers drop file if it exists.
///
/// Absence is non-fatal: releasing a grant that was never acquired (or was
/// already released) only logs a debug message.
///
/// # Errors
///
/// Returns an error when the removal command fails.
pub fn remove_sudo_nopasswd(executor: &dyn Executor) -> Result<(), PrivilegeError> {
    remove_drop_file(executor, Path::new(SUDOERS_DROP_FILE))
}

fn remove_drop_file(executor: &dyn Executor, drop_file: &Path) -> Result<(), PrivilegeError> {
    if !drop_file.exists() {
        tracing::debug!("{} not present, nothing to remove", drop_file.display());
        return Ok(());
    }
    let path = drop_file.display().to_string();
    let result = executor
        .run_unchecked("sudo", &["rm", &path])
        .map_err(|e| PrivilegeError::RevokeFailed(e.to_string()))?;
    if !result.success {
        return Err(PrivilegeError::RevokeFailed(format!(
            "sudo rm {path} exited {}",
            result.code.unwrap_or(-1)
        )));
    }
    tracing::info!("removed {path}");
    Ok(())
}
