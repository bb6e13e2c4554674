// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tstep` — out-of-band reassembly/archival/compression manager for
//! partitioned OpenFOAM case output.

mod commands;
mod config;
mod exit_error;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tstep", version = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clean up incomplete state and seed the producer, then exit.
    Setup(commands::setup::SetupArgs),
    /// Run the manager loop.
    Monitor(commands::monitor::MonitorArgs),
    /// Config file helpers.
    Config(commands::config_cmd::ConfigArgs),
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Setup(args) => commands::setup::run(args),
        Commands::Monitor(args) => commands::monitor::run(args),
        Commands::Config(args) => commands::config_cmd::run(args),
    };

    if let Err(error) = result {
        match error.downcast::<ExitError>() {
            Ok(exit_error) => {
                eprintln!("error: {exit_error}");
                std::process::exit(exit_error.code);
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                std::process::exit(1);
            }
        }
    }
}
