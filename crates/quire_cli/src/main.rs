//! Quire CLI: incremental document builds from the command line.
//!
//! `quire build` brings outputs up to date, `quire clean` removes the build and
//! cache directories, and `quire rebuild` does both. Without a target the
//! available targets are listed.

#![warn(missing_docs)]

mod run;

use std::process;
use std::str::FromStr;

use clap::Parser;
use quire_engine::Target;

/// Quire, an incremental document builder.
#[derive(Parser, Debug)]
#[command(name = "quire", version, about = "Incremental document builder")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose (debug-level) output and list executed tasks.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `quire.toml` file or to the project directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Target to run: build, clean or rebuild.
    pub target: Option<String>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a config file or project directory.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    run::init_logging(&global);

    let Some(name) = cli.target else {
        print_usage();
        process::exit(0);
    };
    let target = match Target::from_str(&name) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("error: {e}");
            print_usage();
            process::exit(2);
        }
    };

    match run::run(target, &global) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("usage: quire [OPTIONS] <TARGET>");
    eprintln!();
    eprintln!("targets:");
    for target in Target::ALL {
        eprintln!("  {:<10}{}", target.as_str(), target.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_no_target() {
        let cli = Cli::parse_from(["quire"]);
        assert!(cli.target.is_none());
        assert!(!cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_target() {
        let cli = Cli::parse_from(["quire", "rebuild"]);
        assert_eq!(cli.target.as_deref(), Some("rebuild"));
    }

    #[test]
    fn unknown_target_is_accepted_by_clap() {
        let cli = Cli::parse_from(["quire", "deploy"]);
        assert_eq!(cli.target.as_deref(), Some("deploy"));
        assert!(Target::from_str("deploy").is_err());
    }

    #[test]
    fn parse_verbose_flag() {
        let cli = Cli::parse_from(["quire", "--verbose", "build"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_flags_after_target() {
        let cli = Cli::parse_from(["quire", "build", "-q"]);
        assert!(cli.quiet);
        assert_eq!(cli.target.as_deref(), Some("build"));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["quire", "-q", "-v", "build"]).is_err());
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["quire", "--config", "/path/to/quire.toml", "clean"]);
        assert_eq!(cli.config.as_deref(), Some("/path/to/quire.toml"));
    }

    #[test]
    fn extra_positional_is_rejected() {
        assert!(Cli::try_parse_from(["quire", "build", "clean"]).is_err());
    }
}
