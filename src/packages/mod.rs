//! Built-in package modules.
//!
//! Each module binds platform-specific handlers into the registry at
//! startup, one registration per (operation, platform, package) triple. New
//! packages plug in by adding a module here and wiring it into
//! [`register_all`].

pub mod base;
pub mod zsh;

use crate::error::ConfigError;
use crate::registry::Registry;

/// Register every built-in package module.
///
/// `deps` is the package list from the root `dependency` file, consumed by
/// [`base`].
///
/// # Errors
///
/// Returns a [`ConfigError`] when any module registers under an invalid key;
/// this indicates a programming mistake in the module and is fatal at the
/// binary boundary.
pub fn register_all(registry: &mut Registry, deps: &[String]) -> Result<(), ConfigError> {
    base::register(registry, deps)?;
    zsh::register(registry)?;
    Ok(())
}
