// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument group and settings resolution for `setup`/`monitor`.

pub mod config_cmd;
pub mod monitor;
pub mod setup;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use tstep_adapters::{JobBackend, LocalBackend, SlurmBackend};
use tstep_engine::EngineError;

use crate::config::{ClusterKind, Config};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ClusterArg {
    Local,
    Slurm,
}

#[derive(Args, Debug, Default)]
pub struct CommonArgs {
    /// OpenFOAM case directory (default ".", or `general.case_directory`
    /// from `--config`).
    #[arg(long)]
    pub case_directory: Option<PathBuf>,

    /// Path to a TOML config file; see `tstep config sample`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub cluster: Option<ClusterArg>,

    /// Spacing between timesteps that are retained at the split stage.
    #[arg(long)]
    pub keep_every: Option<Decimal>,

    /// Window size for grouping tars into one compressed archive; must be
    /// an integer multiple of `--keep-every`.
    #[arg(long)]
    pub compress_every: Option<Decimal>,

    #[arg(long)]
    pub requeue: bool,

    #[arg(long)]
    pub num_simultaneous_tasks: Option<usize>,

    #[arg(long)]
    pub sleep_time_per_update: Option<u64>,

    /// 0 disables periodic re-planning; the loop then drains whatever is
    /// already queued and exits.
    #[arg(long)]
    pub recheck_every_num_updates: Option<u32>,

    /// Job script Slurm re-submits on requeue (cluster = slurm).
    #[arg(long)]
    pub job_sfile: Option<String>,

    /// Template sbatch script filled in and submitted for compression
    /// (cluster = slurm).
    #[arg(long)]
    pub compress_sfile_template: Option<String>,
}

pub struct ResolvedSettings {
    pub case_dir: PathBuf,
    pub keep_every: Decimal,
    pub compress_every: Decimal,
    pub requeue: bool,
    pub num_simultaneous_tasks: usize,
    pub sleep_time_per_update: Duration,
    pub recheck_every_num_updates: Option<u32>,
    pub backend: ManagerBackend,
}

/// The two concrete `JobBackend` implementations, chosen at the CLI layer
/// from `--cluster`/`general.cluster`. A sum type rather than `Box<dyn
/// JobBackend>` since there are exactly two variants and neither the
/// Listener nor the Driver need open-ended polymorphism here.
pub enum ManagerBackend {
    Local(LocalBackend),
    Slurm(SlurmBackend),
}

impl JobBackend for ManagerBackend {
    fn requeue_job(&mut self) -> Result<(), tstep_adapters::AdapterError> {
        match self {
            ManagerBackend::Local(b) => b.requeue_job(),
            ManagerBackend::Slurm(b) => b.requeue_job(),
        }
    }

    fn compress(&mut self, archive_name: &str, files: &[String]) -> Result<(), tstep_adapters::AdapterError> {
        match self {
            ManagerBackend::Local(b) => b.compress(archive_name, files),
            ManagerBackend::Slurm(b) => b.compress(archive_name, files),
        }
    }
}

/// Merges `args` over `config` (CLI wins), applying spec.md §6's hard
/// defaults last, and constructs the concrete `JobBackend`.
pub fn resolve(args: &CommonArgs) -> anyhow::Result<ResolvedSettings> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let case_dir = args.case_directory.clone().unwrap_or(config.general.case_directory.clone());

    let keep_every = args
        .keep_every
        .or(config.openfoam.keep_every)
        .ok_or_else(|| EngineError::InvalidConfiguration("--keep-every is required".into()))?;
    let compress_every = args
        .compress_every
        .or(config.openfoam.compress_every)
        .ok_or_else(|| EngineError::InvalidConfiguration("--compress-every is required".into()))?;
    let requeue = args.requeue || config.openfoam.requeue;
    let num_simultaneous_tasks = args.num_simultaneous_tasks.unwrap_or(config.taskqueue.num_simultaneous_tasks);
    let sleep_time_per_update =
        Duration::from_secs(args.sleep_time_per_update.unwrap_or(config.openfoam.sleep_time_per_update));
    let recheck = args.recheck_every_num_updates.unwrap_or(config.openfoam.recheck_every_num_updates);
    let recheck_every_num_updates = if recheck == 0 { None } else { Some(recheck) };

    let cluster = args.cluster.map(|c| matches!(c, ClusterArg::Slurm)).unwrap_or(matches!(config.general.cluster, ClusterKind::Slurm));

    let backend = if cluster {
        let job_sfile = args
            .job_sfile
            .clone()
            .or(config.slurm.as_ref().map(|s| s.job_sfile.clone()))
            .ok_or_else(|| EngineError::InvalidConfiguration("--job-sfile is required for cluster = slurm".into()))?;
        let compress_sfile_template = args
            .compress_sfile_template
            .clone()
            .or(config.slurm.as_ref().map(|s| s.compress_sfile_template.clone()))
            .ok_or_else(|| EngineError::InvalidConfiguration("--compress-sfile-template is required for cluster = slurm".into()))?;
        let job_id = std::env::var("SLURM_JOB_ID")
            .map_err(|_| EngineError::InvalidConfiguration("SLURM_JOB_ID is not set".into()))?;
        ManagerBackend::Slurm(SlurmBackend::new(&case_dir, job_sfile, job_id, compress_sfile_template)?)
    } else {
        ManagerBackend::Local(LocalBackend::new(&case_dir))
    };

    Ok(ResolvedSettings {
        case_dir,
        keep_every,
        compress_every,
        requeue,
        num_simultaneous_tasks,
        sleep_time_per_update,
        recheck_every_num_updates,
        backend,
    })
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
