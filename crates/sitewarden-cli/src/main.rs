//! sitewarden CLI
//!
//! Audits and enforces ownership and permission policy across website trees.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute_command(cli.command)
}

fn init_tracing(verbose: bool) {
    let installed = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    if installed.is_err() {
        eprintln!("{}: tracing subscriber already installed", "warning".yellow().bold());
    }
    if verbose {
        tracing::debug!("Verbose mode enabled");
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Check { target } => commands::run_check(&target.config, &target.sites),
        Commands::Fix { target } => commands::run_fix(&target.config, &target.sites),
        Commands::Validate { config } => commands::run_validate(&config),
    }
}
