use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the bootstrap engine.
#[derive(Parser, Debug)]
#[command(
    name = "envup",
    about = "Personal environment bootstrap engine",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the working directory holding UID, dependency and the run log
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install registered packages for the detected platform
    Install(FilterOpts),
    /// Uninstall registered packages
    Uninstall(FilterOpts),
    /// Check which registered packages are present
    Check(FilterOpts),
    /// Print version information
    Version,
}

/// Package-name filters shared by the dispatching subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct FilterOpts {
    /// Skip specific packages
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific packages
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install() {
        let cli = Cli::parse_from(["envup", "install"]);
        assert!(matches!(cli.command, Command::Install(_)));
    }

    #[test]
    fn parse_install_skip_packages() {
        let cli = Cli::parse_from(["envup", "install", "--skip", "zsh,git"]);
        if let Command::Install(opts) = cli.command {
            assert_eq!(opts.skip, vec!["zsh", "git"]);
        } else {
            panic!("expected install command");
        }
    }

    #[test]
    fn parse_check_only_packages() {
        let cli = Cli::parse_from(["envup", "check", "--only", "zsh"]);
        if let Command::Check(opts) = cli.command {
            assert_eq!(opts.only, vec!["zsh"]);
        } else {
            panic!("expected check command");
        }
    }

    #[test]
    fn parse_uninstall() {
        let cli = Cli::parse_from(["envup", "uninstall"]);
        assert!(matches!(cli.command, Command::Uninstall(_)));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["envup", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["envup", "-v", "install"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_root_override() {
        let cli = Cli::parse_from(["envup", "--root", "/tmp/bootstrap", "install"]);
        assert_eq!(
            cli.global.root,
            Some(std::path::PathBuf::from("/tmp/bootstrap"))
        );
    }
}
