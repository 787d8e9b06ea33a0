#![deny(missing_docs)]

//! # apigen CLI
//!
//! Command line front end of the API scaffolding generator.
//!
//! Supported Commands:
//! - `generate` (default): Generates logic, handler and route registration for
//!   every configured route path.
//! - `tree`: Prints the route group tree of the configured router function.

use apigen_core::strategies::ActixStrategy;
use apigen_core::{AppResult, Config};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod generate;
mod tree;

#[derive(Parser, Debug)]
#[clap(author, version, about = "API scaffolding generator")]
struct Cli {
    /// Path to the configuration file.
    #[clap(short, long, default_value = "config.yaml", env = "APIGEN_CONFIG")]
    config: PathBuf,

    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate logic, handlers and route registrations (default).
    Generate,
    /// Print the route group tree of the router entry function.
    Tree,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: &Cli) -> AppResult<()> {
    let config = Config::load(&cli.config)?;

    match cli.command.as_ref().unwrap_or(&Commands::Generate) {
        Commands::Generate => {
            // Injecting Actix Web strategy
            let strategy = ActixStrategy;
            generate::execute(&config, &strategy)
        }
        Commands::Tree => tree::execute(&config),
    }
}
