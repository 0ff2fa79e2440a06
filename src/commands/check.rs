//! The `check` subcommand.

use std::path::Path;

use anyhow::{Result, bail};

use crate::cli::FilterOpts;
use crate::context::Context;
use crate::logging::{Logger, TaskStatus};
use crate::registry::{Operation, Registry};

/// Probe every registered package and report which are present.
///
/// Exits non-zero when any package is missing or any probe failed, so the
/// command doubles as a health check in scripts.
///
/// # Errors
///
/// Returns an error on fatal setup problems, when a probe failed, or when a
/// package is not installed.
pub fn run(root: &Path, opts: &FilterOpts, log: &Logger) -> Result<()> {
    let (ctx, registry) = super::setup(root)?;

    run_probes(&registry, &ctx, log, &opts.only, &opts.skip);

    log.print_summary();
    if log.has_failures() {
        bail!("one or more package checks failed");
    }
    let missing = log.missing_count();
    if missing > 0 {
        bail!("{missing} package(s) not installed");
    }
    Ok(())
}

/// Dispatch every check probe for the current platform.
fn run_probes(registry: &Registry, ctx: &Context, log: &Logger, only: &[String], skip: &[String]) {
    for (package, handler) in registry.get_handlers(Operation::Check, ctx.platform) {
        if !super::selected(package, only, skip) {
            log.debug(&format!("skipping {package} (filtered)"));
            log.record_task(package, TaskStatus::Skipped, Some("filtered"));
            continue;
        }
        match handler.run_probe(ctx) {
            Ok(true) => {
                log.debug(&format!("{package} installed"));
                log.record_task(package, TaskStatus::Ok, Some("installed"));
            }
            Ok(false) => {
                log.info(&format!("{package} not installed"));
                log.record_task(package, TaskStatus::Missing, Some("not installed"));
            }
            Err(e) => {
                log.error(&format!("{package}: {e:#}"));
                log.record_task(package, TaskStatus::Failed, Some(&format!("{e:#}")));
            }
        }
    }
}
