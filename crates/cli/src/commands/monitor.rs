// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tstep monitor` — run the driver loop indefinitely, or once for
//! debugging.

use clap::Args;
use tracing::info;
use tstep_core::RealSleeper;
use tstep_engine::{Driver, Listener};

use crate::commands::{resolve, CommonArgs};
use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Run exactly one plan-and-drain cycle then exit, instead of looping
    /// forever.
    #[arg(long)]
    pub once: bool,
}

pub fn run(args: MonitorArgs) -> anyhow::Result<()> {
    let settings = resolve(&args.common)?;

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

    info!(once = args.once, "starting monitor loop");
    driver.monitor(args.once).map_err(ExitError::from)?;
    Ok(())
}
