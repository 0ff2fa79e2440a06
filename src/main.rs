use anyhow::Result;
use clap::Parser as _;

use envup_cli::cli::{Cli, Command};
use envup_cli::{commands, context, logging};

fn main() -> Result<()> {
    // Best effort; older Windows consoles ignore ANSI without this.
    let _ = enable_ansi_support::enable_ansi_support();

    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if matches!(cli.command, Command::Version) {
        println!("envup {}", envup_cli::version());
        return Ok(());
    }

    let root = commands::resolve_root(cli.global.root.as_deref())?;
    let log = logging::Logger::new(cli.verbose, root.join(context::LOG_FILE));

    match cli.command {
        Command::Install(ref opts) => commands::install::run(&root, opts, &log),
        Command::Uninstall(ref opts) => commands::uninstall::run(&root, opts, &log),
        Command::Check(ref opts) => commands::check::run(&root, opts, &log),
        Command::Version => Ok(()),
    }
}
