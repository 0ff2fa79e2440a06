//! Base packages driven by the root `dependency` file.
//!
//! Every entry of the dependency list gets an install handler per Linux
//! platform and a check probe on ubuntu. A package listed in an optional
//! `hold` file next to the dependency file is skipped at install time, so a
//! machine can locally opt out of individual packages without editing the
//! shared list.

use crate::error::ConfigError;
use crate::exec::{Permission, dpkg_check};
use crate::fsutil;
use crate::registry::Registry;

/// Name of the optional per-machine opt-out file in the working directory.
const HOLD_FILE: &str = "hold";

/// Register install and check handlers for every dependency entry.
///
/// # Errors
///
/// Returns a [`ConfigError`] on an invalid registration key.
pub fn register(registry: &mut Registry, deps: &[String]) -> Result<(), ConfigError> {
    for dep in deps {
        let name = dep.clone();
        registry.register_action("ubuntu", "install", dep, move |ctx| {
            if fsutil::file2set(&ctx.workdir.join(HOLD_FILE)).contains(&name) {
                tracing::info!("{name} is held, skipping install");
                return Ok(());
            }
            tracing::info!("installing {name}");
            ctx.executor
                .run("apt-get", &["install", "-y", &name], Permission::Root)
        })?;

        let name = dep.clone();
        registry.register_action("arch", "install", dep, move |ctx| {
            if fsutil::file2set(&ctx.workdir.join(HOLD_FILE)).contains(&name) {
                tracing::info!("{name} is held, skipping install");
                return Ok(());
            }
            tracing::info!("installing {name}");
            ctx.executor
                .run("pacman", &["-S", "--noconfirm", &name], Permission::Root)
        })?;

        let name = dep.clone();
        registry.register_probe("ubuntu", "check", dep, move |ctx| {
            dpkg_check(ctx.executor.as_ref(), &name)
        })?;

        let name = dep.clone();
        registry.register_probe("arch", "check", dep, move |ctx| {
            let result = ctx.executor.run_unchecked("pacman", &["-Q", &name])?;
            Ok(result.success)
        })?;
    }
    Ok(())
}
