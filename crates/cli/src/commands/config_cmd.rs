// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tstep config` — config file helpers.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use tracing::info;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a config file populated with sample values to `path`.
    Sample { path: PathBuf },
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Sample { path } => {
            Config::write_sample(&path)?;
            info!(path = %path.display(), "wrote sample config");
            Ok(())
        }
    }
}
