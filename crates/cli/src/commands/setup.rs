// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tstep setup` — run the cleanup/seed protocol then exit.

use clap::Args;
use tracing::info;
use tstep_core::RealSleeper;
use tstep_engine::{Driver, FileState, Listener};

use crate::commands::{resolve, CommonArgs};
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct SetupArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print the cleanup/seed plan without executing it.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: SetupArgs) -> anyhow::Result<()> {
    let settings = resolve(&args.common)?;

    if args.dry_run {
        let state = FileState::new(&settings.case_dir).map_err(ExitError::from)?;
        for t in state.split_times() {
            info!(timestep = %t, "would attempt inline reassembly during cleanup");
        }
        for t in state.reconstructed_dir_candidates() {
            if !state.is_reconstructed(t.as_str()) {
                info!(timestep = %t, "would delete incomplete reconstructed directory");
            }
        }
        return Ok(());
    }

    let listener = Listener::new(settings.keep_every, settings.compress_every, settings.backend, settings.requeue)
        .map_err(ExitError::from)?;
    let mut driver = Driver::new(
        settings.case_dir,
        listener,
        settings.num_simultaneous_tasks,
        RealSleeper,
        settings.sleep_time_per_update,
        settings.recheck_every_num_updates,
    );
    driver.setup().map_err(ExitError::from)?;
    info!("case directory is ready");
    Ok(())
}
