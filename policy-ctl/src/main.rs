//! Policy inspection CLI - print, evaluate and lint the sandbox syscall policy

mod cli;
mod commands;
mod config;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use config::{Overrides, resolve_config};
use console::style;
use sandbox_policy::{Policy, Result};

fn run(cli: Cli) -> Result<bool> {
    if let Commands::Arches = cli.command {
        commands::list_arches();
        return Ok(true);
    }

    let overrides = Overrides {
        allow_fork: cli.allow_fork,
        read_write: cli.read_write,
        arches: cli.arches,
    };
    let config = resolve_config(cli.config.as_deref(), &overrides)?;
    let policy = Policy::new(&config)?;

    match cli.command {
        Commands::Rules { json } => commands::print_rules(&policy, json)?,
        Commands::Check { syscall, args } => commands::check(&policy, &syscall, &args)?,
        Commands::Lint => return Ok(commands::lint(&policy)),
        Commands::Arches => commands::list_arches(),
    }
    Ok(true)
}

fn main() {
    let cli = Cli::parse();

    logging::init_logger(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}
