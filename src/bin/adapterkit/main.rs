//! adapterkit CLI - inspect and validate ad-server adapter configuration

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use adapterkit::adapter::AdapterError;
use adapterkit::util::diagnostic::{self, Diagnostic};
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && io::stderr().is_terminal();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command, color) {
        match e.downcast_ref::<AdapterError>() {
            Some(err) => diagnostic::emit(&Diagnostic::from_adapter_error(err), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries command output only.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("adapterkit={}", level)))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(command: Commands, color: bool) -> Result<()> {
    match command {
        Commands::List(args) => commands::list::execute(args),
        Commands::Describe(args) => commands::describe::execute(args),
        Commands::Validate(args) => commands::validate::execute(args, color),
        Commands::Simulate(args) => commands::simulate::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
