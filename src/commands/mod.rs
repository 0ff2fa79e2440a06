//! Top-level subcommand orchestration.
//!
//! Each command resolves the working directory, builds the immutable
//! [`Context`], populates the registry from the built-in package modules and
//! dispatches the matching handlers sequentially. Per-package failures are
//! recorded and reported in the summary; the command fails at the end if any
//! handler failed.

pub mod check;
pub mod install;
pub mod uninstall;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::context::Context;
use crate::fsutil;
use crate::logging::{Logger, TaskStatus};
use crate::packages;
use crate::registry::{Operation, Registry};

/// Resolve the working directory from the `--root` flag or the current dir.
///
/// # Errors
///
/// Returns an error when the current directory cannot be determined.
pub fn resolve_root(root: Option<&Path>) -> Result<PathBuf> {
    match root {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Build the context and the fully-registered package registry for `root`.
///
/// # Errors
///
/// Returns an error when context initialisation fails, the `dependency`
/// file is absent, or a package module registers under an invalid key —
/// all fatal configuration problems.
pub(crate) fn setup(root: &Path) -> Result<(Context, Registry)> {
    let ctx = Context::init(root)?;
    let deps = fsutil::get_dependencies(root)?;
    let mut registry = Registry::new();
    packages::register_all(&mut registry, &deps)?;
    Ok((ctx, registry))
}

/// Whether `package` passes the `--only`/`--skip` name filters.
///
/// `--only` wins when both are given; matching is case-insensitive on name
/// fragments.
pub(crate) fn selected(package: &str, only: &[String], skip: &[String]) -> bool {
    let name = package.to_lowercase();
    if !only.is_empty() {
        return only.iter().any(|o| name.contains(&o.to_lowercase()));
    }
    if !skip.is_empty() {
        return !skip.iter().any(|s| name.contains(&s.to_lowercase()));
    }
    true
}

/// Dispatch every action handler for `operation` on the current platform.
///
/// Failures are logged and recorded but do not stop the batch; the caller
/// inspects the logger afterwards.
pub(crate) fn run_actions(
    registry: &Registry,
    operation: Operation,
    ctx: &Context,
    log: &Logger,
    only: &[String],
    skip: &[String],
) {
    for (package, handler) in registry.get_handlers(operation, ctx.platform) {
        if !selected(package, only, skip) {
            log.debug(&format!("skipping {package} (filtered)"));
            log.record_task(package, TaskStatus::Skipped, Some("filtered"));
            continue;
        }
        log.stage(&format!("{operation} {package}"));
        match handler.run_action(ctx) {
            Ok(()) => log.record_task(package, TaskStatus::Ok, None),
            Err(e) => {
                log.error(&format!("{package}: {e:#}"));
                log.record_task(package, TaskStatus::Failed, Some(&format!("{e:#}")));
            }
        }
    }
}
