//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Configuration read when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "/etc/sitewarden/config.json";

/// sitewarden - Audit and enforce ownership and permissions of website trees
#[derive(Parser, Debug)]
#[command(name = "sitewarden")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Report policy drift without changing anything
    ///
    /// Examples:
    ///   sitewarden check
    ///   sitewarden check -c ./config.yaml --site /srv/www/example.com
    Check {
        #[command(flatten)]
        target: Target,
    },

    /// Correct policy drift in place
    ///
    /// Changes modes, owners and groups, and deletes stale entries from
    /// keep_empty directories. Prints one line per change.
    Fix {
        #[command(flatten)]
        target: Target,
    },

    /// Lint the configuration without touching any site
    Validate {
        /// Path to the configuration document (.json, .yaml, .yml, .toml)
        #[arg(short, long, env = "SITEWARDEN_CONFIG", default_value = DEFAULT_CONFIG)]
        config: PathBuf,
    },
}

/// Configuration and site selection shared by `check` and `fix`.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Path to the configuration document (.json, .yaml, .yml, .toml)
    #[arg(short, long, env = "SITEWARDEN_CONFIG", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Only process this site root (repeatable)
    #[arg(short, long = "site", value_name = "ROOT")]
    pub sites: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_check_with_sites() {
        let cli = Cli::try_parse_from([
            "sitewarden",
            "check",
            "-c",
            "/tmp/config.json",
            "--site",
            "/srv/www/a",
            "--site",
            "/srv/www/b",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Commands::Check {
                target: Target {
                    config: PathBuf::from("/tmp/config.json"),
                    sites: vec!["/srv/www/a".into(), "/srv/www/b".into()],
                }
            }
        );
    }

    #[test]
    fn parse_global_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(["sitewarden", "validate", "-c", "c.toml", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["sitewarden"]).is_err());
    }
}
