mod aggregate;
mod cli;
mod commands;
mod discovery;
mod error;
mod loader;
mod model;
mod parse;
mod report;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

const FAILURE_EXIT_CODE: i32 = 2;

fn main() {
    init_tracing();
    std::process::exit(exit_code(run()));
}

fn exit_code(result: Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            for cause in err.chain().skip(1) {
                debug!(cause = %cause, "caused by");
            }
            FAILURE_EXIT_CODE
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => commands::check::run(args),
        Commands::Discover(args) => commands::discover::run(args).map(|()| 0),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
