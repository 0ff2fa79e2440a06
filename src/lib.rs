//! Personal environment bootstrap engine.
//!
//! envup installs, uninstalls and checks a registered set of packages on the
//! machine it runs on. Package modules bind platform-specific handlers into a
//! central [`registry`] at startup; the command drivers in [`commands`] then
//! dispatch every handler matching the detected [`platform`]. Commands run
//! against a working directory holding the `UID` credential file, the
//! `dependency` package list and the append-mode run log.

#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod exec;
pub mod fsutil;
pub mod logging;
pub mod packages;
pub mod platform;
pub mod privilege;
pub mod registry;

/// The version string embedded at build time.
///
/// Prefers the `ENVUP_VERSION` build environment variable (set from `git
/// describe` by the build script) and falls back to the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("ENVUP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}
