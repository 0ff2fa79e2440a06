//! Domain-specific error types for the bootstrap engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`PrivilegeError`]) while command handlers at the CLI boundary convert
//! them to [`anyhow::Error`] via the standard `?` operator.
//!
//! Configuration errors indicate a programming mistake in a package
//! definition or a broken working directory and are always fatal: `main`
//! surfaces them and exits with status 1. No library code terminates the
//! process itself, so the fatal paths stay testable as ordinary `Result`s.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the bootstrap engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum EnvupError {
    /// Configuration-related error (registration keys, credential file, dependency file).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Platform-specific operation error (detection failure, unknown user).
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Privilege-grant operation error (sudoers drop file management).
    #[error("Privilege error: {0}")]
    Privilege(#[from] PrivilegeError),
}

/// Errors that indicate a broken package definition or working directory.
///
/// These are fatal by design: they are raised while the registry is being
/// built, before any shell command has run.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The platform key is not in the allow-list.
    #[error("Invalid platform '{0}': must be one of ubuntu, arch, windows, macos")]
    UnknownPlatform(String),

    /// The operation key is not in the allow-list.
    #[error("Invalid operation '{0}': must be one of install, uninstall, check")]
    UnknownOperation(String),

    /// An action handler was registered under `check`, or a probe handler
    /// under `install`/`uninstall`.
    #[error("Package '{package}' registered a {kind} handler under operation '{operation}'")]
    HandlerKind {
        /// Package whose registration was rejected.
        package: String,
        /// Operation the handler was registered under.
        operation: String,
        /// Kind of the rejected handler (`"action"` or `"probe"`).
        kind: &'static str,
    },

    /// The `dependency` file is absent from a package directory.
    #[error("Dependency file not found: {0}")]
    MissingDependencyFile(PathBuf),

    /// The `UID` credential file is missing or its first line is not an integer.
    #[error("Invalid credential file {path}: {reason}")]
    Credential {
        /// Path of the credential file.
        path: PathBuf,
        /// Why it could not be used.
        reason: String,
    },
}

/// Errors that arise from platform and user introspection.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The detected OS/distribution is not in the platform allow-list.
    #[error("Unsupported platform '{0}'")]
    Unsupported(String),

    /// Platform detection failed (e.g., unreadable `/etc/os-release`).
    #[error("Platform detection failed: {0}")]
    DetectionFailed(String),

    /// The origin uid has no entry in the passwd database.
    #[error("No user record for uid {0}")]
    UnknownUser(u32),
}

/// Errors that arise from passwordless-sudo grant management.
#[derive(Error, Debug)]
pub enum PrivilegeError {
    /// Writing the sudoers drop file failed.
    #[error("Failed to add sudoers drop file: {0}")]
    GrantFailed(String),

    /// `sudo -l` failed, so the grant state could not be determined.
    #[error("Failed to check sudo privileges: {0}")]
    CheckFailed(String),

    /// Removing the sudoers drop file failed.
    #[error("Failed to remove sudoers drop file: {0}")]
    RevokeFailed(String),
}
