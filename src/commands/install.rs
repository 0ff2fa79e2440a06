//! The `install` subcommand.

use std::path::Path;

use anyhow::{Result, bail};

use crate::cli::FilterOpts;
use crate::logging::Logger;
use crate::privilege;
use crate::registry::Operation;

/// Install every registered package for the detected platform.
///
/// A passwordless sudo grant is acquired before the batch and released
/// afterwards so a long install run does not prompt repeatedly. Release
/// failures are reported but never mask the install result.
///
/// # Errors
///
/// Returns an error on fatal setup problems or when any package handler
/// failed.
pub fn run(root: &Path, opts: &FilterOpts, log: &Logger) -> Result<()> {
    let (ctx, registry) = super::setup(root)?;

    let manage_grant = ctx.platform.has_sudo();
    if manage_grant {
        log.stage("Acquiring passwordless sudo");
        match privilege::check_sudo_nopasswd(ctx.executor.as_ref()) {
            Ok(true) => log.debug("passwordless sudo already active"),
            Ok(false) => privilege::add_sudo_nopasswd(ctx.executor.as_ref(), &ctx.username)?,
            Err(e) => {
                log.warn(&format!("could not check sudo state: {e}"));
                privilege::add_sudo_nopasswd(ctx.executor.as_ref(), &ctx.username)?;
            }
        }
    }

    super::run_actions(&registry, Operation::Install, &ctx, log, &opts.only, &opts.skip);

    if manage_grant {
        if let Err(e) = privilege::remove_sudo_nopasswd(ctx.executor.as_ref()) {
            log.warn(&format!("could not release sudo grant: {e}"));
        }
    }

    log.print_summary();
    if log.has_failures() {
        bail!("one or more package installs failed");
    }
    Ok(())
}
