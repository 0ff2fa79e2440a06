//! The zsh package: install, uninstall and presence checks.
//!
//! Install also makes zsh the origin user's login shell and ensures a
//! `~/.zshrc` exists, created as the origin user so ownership stays with the
//! invoking human rather than root.

use anyhow::Result;

use crate::context::Context;
use crate::error::ConfigError;
use crate::exec::{Permission, command_check, dpkg_check};
use crate::fsutil;
use crate::registry::Registry;

const PACKAGE: &str = "zsh";
const ZSH_BIN: &str = "/usr/bin/zsh";

/// Register zsh handlers for ubuntu and arch.
///
/// # Errors
///
/// Returns a [`ConfigError`] on an invalid registration key.
pub fn register(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register_action("ubuntu", "install", PACKAGE, |ctx| {
        ctx.executor
            .run("apt-get", &["install", "-y", PACKAGE], Permission::Root)?;
        configure_login_shell(ctx)
    })?;
    registry.register_action("ubuntu", "uninstall", PACKAGE, |ctx| {
        ctx.executor
            .run("apt-get", &["remove", "-y", PACKAGE], Permission::Root)
    })?;
    registry.register_probe("ubuntu", "check", PACKAGE, |ctx| {
        dpkg_check(ctx.executor.as_ref(), PACKAGE)
    })?;

    registry.register_action("arch", "install", PACKAGE, |ctx| {
        ctx.executor
            .run("pacman", &["-S", "--noconfirm", PACKAGE], Permission::Root)?;
        configure_login_shell(ctx)
    })?;
    registry.register_action("arch", "uninstall", PACKAGE, |ctx| {
        ctx.executor
            .run("pacman", &["-R", "--noconfirm", PACKAGE], Permission::Root)
    })?;
    registry.register_probe("arch", "check", PACKAGE, |ctx| {
        Ok(command_check(ctx.executor.as_ref(), PACKAGE))
    })?;

    Ok(())
}

/// Make zsh the origin user's login shell and ensure `~/.zshrc` exists.
fn configure_login_shell(ctx: &Context) -> Result<()> {
    ctx.executor
        .run("chsh", &["-s", ZSH_BIN, &ctx.username], Permission::Root)?;

    let zshrc = ctx.expanduser("~/.zshrc");
    if zshrc.exists() {
        if !fsutil::user_has_write_permission(&zshrc, ctx.origin_uid) {
            tracing::warn!(
                "{} exists but is not writable by {}",
                zshrc.display(),
                ctx.username
            );
        }
        return Ok(());
    }
    let path = zshrc.display().to_string();
    ctx.executor.run("touch", &[&path], Permission::User)
}
