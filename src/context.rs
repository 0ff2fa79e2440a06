//! Immutable execution context resolved once at startup.
//!
//! The context carries the identity of the *origin* user — the human who
//! invoked the tool, as distinct from the (typically elevated) effective
//! process user — alongside the detected platform and the shared executor.
//! It is initialised from the `UID` credential file and OS introspection
//! before any handler runs and never mutated afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::error::{ConfigError, PlatformError};
use crate::exec::{Executor, SystemExecutor};
use crate::fsutil;
use crate::platform::Platform;

/// Name of the credential file in the working directory. Its first line is
/// the integer uid of the invoking (non-root) user.
pub const UID_FILE: &str = "UID";

/// Name of the append-mode run log in the working directory.
pub const LOG_FILE: &str = ".log";

/// Shared, immutable state for handler execution.
pub struct Context {
    /// Uid of the invoking user, from the `UID` credential file.
    pub origin_uid: u32,
    /// Username resolved from the passwd database for `origin_uid`.
    pub username: String,
    /// Home directory of the origin user (not the effective user).
    pub origin_home: PathBuf,
    /// Detected platform.
    pub platform: Platform,
    /// Working directory holding `UID`, `dependency` and the run log.
    pub workdir: PathBuf,
    /// Path of the append-mode run log.
    pub log_file: PathBuf,
    /// Command executor (mockable in tests).
    pub executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("origin_uid", &self.origin_uid)
            .field("username", &self.username)
            .field("origin_home", &self.origin_home)
            .field("platform", &self.platform)
            .field("workdir", &self.workdir)
            .field("log_file", &self.log_file)
            .field("executor", &"<dyn Executor>")
            .finish()
    }
}

impl Context {
    /// Build the context for `workdir`: read the `UID` credential file,
    /// resolve the origin user, detect the platform and wire the system
    /// executor to the run log.
    ///
    /// # Errors
    ///
    /// Returns an error when the credential file is missing or malformed,
    /// the uid has no passwd entry, or platform detection fails. All of
    /// these are fatal at the binary boundary.
    pub fn init(workdir: &Path) -> Result<Self> {
        let platform = Platform::detect()?;
        let origin_uid = read_origin_uid(&workdir.join(UID_FILE))?;
        let (username, origin_home) = lookup_user(origin_uid)?;
        let log_file = workdir.join(LOG_FILE);
        let executor: Arc<dyn Executor> =
            Arc::new(SystemExecutor::new(username.clone(), log_file.clone()));
        Ok(Self {
            origin_uid,
            username,
            origin_home,
            platform,
            workdir: workdir.to_path_buf(),
            log_file,
            executor,
        })
    }

    /// Expand a leading `~` to the origin user's home directory.
    ///
    /// Operations may run under elevated privilege, but paths are resolved
    /// for the invoking human, never for the effective user.
    #[must_use]
    pub fn expanduser(&self, path: &str) -> PathBuf {
        fsutil::expanduser(path, &self.origin_home)
    }
}

/// Read the origin uid from the first line of the credential file.
///
/// # Errors
///
/// Returns a [`ConfigError::Credential`] when the file is missing, empty or
/// its first line is not an integer.
pub fn read_origin_uid(path: &Path) -> Result<u32, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Credential {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let first_line = contents.lines().next().unwrap_or("").trim();
    first_line.parse().map_err(|_| ConfigError::Credential {
        path: path.to_path_buf(),
        reason: format!("first line '{first_line}' is not an integer uid"),
    })
}

/// Resolve username and home directory for a uid from the passwd database.
#[cfg(unix)]
fn lookup_user(uid: u32) -> Result<(String, PathBuf), PlatformError> {
    let user = nix::unistd::User::from_uid(nix::unistd::Uid::from_raw(uid))
        .map_err(|e| PlatformError::DetectionFailed(format!("passwd lookup failed: {e}")))?
        .ok_or(PlatformError::UnknownUser(uid))?;
    Ok((user.name, user.dir))
}

/// Best-effort user resolution where no passwd database exists.
#[cfg(not(unix))]
fn lookup_user(uid: u32) -> Result<(String, PathBuf), PlatformError> {
    let username = std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .map_err(|_| PlatformError::UnknownUser(uid))?;
    let home = dirs::home_dir().ok_or(PlatformError::UnknownUser(uid))?;
    Ok((username, home))
}

/// Context factory for unit tests across the crate.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_helpers {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::Context;
    use crate::exec::Executor;
    use crate::exec::test_helpers::MockExecutor;
    use crate::platform::Platform;

    /// Build a context for user `testuser` on ubuntu, backed by a succeeding
    /// [`MockExecutor`] and a temp working directory.
    pub fn test_context() -> (Context, tempfile::TempDir) {
        test_context_with(Arc::new(MockExecutor::ok("")))
    }

    /// Same as [`test_context`], with a caller-supplied executor.
    pub fn test_context_with(executor: Arc<dyn Executor>) -> (Context, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            origin_uid: 1000,
            username: "testuser".to_string(),
            origin_home: PathBuf::from("/home/testuser"),
            platform: Platform::Ubuntu,
            workdir: dir.path().to_path_buf(),
            log_file: dir.path().join(super::LOG_FILE),
            executor,
        };
        (ctx, dir)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use test_helpers::test_context;

    #[test]
    fn read_origin_uid_parses_first_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(UID_FILE);
        std::fs::write(&path, "1000\n").unwrap();
        assert_eq!(read_origin_uid(&path).unwrap(), 1000);
    }

    #[test]
    fn read_origin_uid_ignores_trailing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(UID_FILE);
        std::fs::write(&path, "501\njunk\n").unwrap();
        assert_eq!(read_origin_uid(&path).unwrap(), 501);
    }

    #[test]
    fn read_origin_uid_missing_file_is_credential_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_origin_uid(&dir.path().join(UID_FILE)).unwrap_err();
        assert!(matches!(err, ConfigError::Credential { .. }));
    }

    #[test]
    fn read_origin_uid_non_integer_is_credential_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(UID_FILE);
        std::fs::write(&path, "alice\n").unwrap();
        let err = read_origin_uid(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Credential { .. }));
        assert!(err.to_string().contains("alice"));
    }

    #[test]
    fn read_origin_uid_empty_file_is_credential_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(UID_FILE);
        std::fs::write(&path, "").unwrap();
        assert!(read_origin_uid(&path).is_err());
    }

    #[test]
    fn expanduser_resolves_against_origin_home() {
        let (ctx, _dir) = test_context();
        assert_eq!(
            ctx.expanduser("~/.zshrc"),
            PathBuf::from("/home/testuser/.zshrc")
        );
    }

    #[test]
    fn expanduser_leaves_absolute_paths_alone() {
        let (ctx, _dir) = test_context();
        assert_eq!(ctx.expanduser("/etc/zsh/zshrc"), PathBuf::from("/etc/zsh/zshrc"));
    }

    #[cfg(unix)]
    #[test]
    fn lookup_user_resolves_root() {
        let (name, home) = lookup_user(0).unwrap();
        assert_eq!(name, "root");
        assert!(!home.as_os_str().is_empty());
    }

    #[test]
    fn debug_format_hides_executor() {
        let (ctx, _dir) = test_context();
        let debug = format!("{ctx:?}");
        assert!(debug.contains("testuser"));
        assert!(debug.contains("<dyn Executor>"));
    }
}
