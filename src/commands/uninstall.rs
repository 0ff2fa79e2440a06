//! The `uninstall` subcommand.

use std::path::Path;

use anyhow::{Result, bail};

use crate::cli::FilterOpts;
use crate::logging::Logger;
use crate::registry::Operation;

/// Uninstall every registered package for the detected platform.
///
/// Unlike install, no sudo grant is acquired up front; removals are rare and
/// a single password prompt is acceptable.
///
/// # Errors
///
/// Returns an error on fatal setup problems or when any package handler
/// failed.
pub fn run(root: &Path, opts: &FilterOpts, log: &Logger) -> Result<()> {
    let (ctx, registry) = super::setup(root)?;

    super::run_actions(
        &registry,
        Operation::Uninstall,
        &ctx,
        log,
        &opts.only,
        &opts.skip,
    );

    log.print_summary();
    if log.has_failures() {
        bail!("one or more package removals failed");
    }
    Ok(())
}
