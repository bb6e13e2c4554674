// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TOML-backed config file, one section per concern, matching
//! `simon/config.py`'s `_FIELDS` table.
//!
//! CLI flags take precedence over whatever the config file sets (clap's
//! usual override order); this module only owns parsing and defaults.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub taskqueue: TaskQueueConfig,
    #[serde(default)]
    pub openfoam: OpenFoamConfig,
    pub slurm: Option<SlurmConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterKind {
    Local,
    Slurm,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub case_directory: PathBuf,
    pub cluster: ClusterKind,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { case_directory: PathBuf::from("."), cluster: ClusterKind::Local }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskQueueConfig {
    pub num_simultaneous_tasks: usize,
}

impl Default for TaskQueueConfig {
    fn default() -> Self {
        Self { num_simultaneous_tasks: 4 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenFoamConfig {
    pub keep_every: Option<Decimal>,
    pub compress_every: Option<Decimal>,
    #[serde(default)]
    pub requeue: bool,
    #[serde(default = "default_sleep_time_per_update")]
    pub sleep_time_per_update: u64,
    #[serde(default = "default_recheck_every_num_updates")]
    pub recheck_every_num_updates: u32,
}

impl Default for OpenFoamConfig {
    fn default() -> Self {
        Self {
            keep_every: None,
            compress_every: None,
            requeue: false,
            sleep_time_per_update: default_sleep_time_per_update(),
            recheck_every_num_updates: default_recheck_every_num_updates(),
        }
    }
}

fn default_sleep_time_per_update() -> u64 {
    2
}

fn default_recheck_every_num_updates() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlurmConfig {
    pub job_sfile: String,
    pub compress_sfile_template: String,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Populated with the sample values from the field tables, for
    /// `config sample <path>` (grounded in `Config.write_sample` in
    /// `simon/config.py`).
    pub fn sample() -> Self {
        Self {
            general: GeneralConfig { case_directory: PathBuf::from("."), cluster: ClusterKind::Local },
            taskqueue: TaskQueueConfig { num_simultaneous_tasks: 4 },
            openfoam: OpenFoamConfig {
                keep_every: Some(Decimal::new(1, 4)),
                compress_every: Some(Decimal::new(1, 2)),
                requeue: true,
                sleep_time_per_update: default_sleep_time_per_update(),
                recheck_every_num_updates: default_recheck_every_num_updates(),
            },
            slurm: Some(SlurmConfig {
                job_sfile: "case.sbatch".to_string(),
                compress_sfile_template: "compress.sbatch.template".to_string(),
            }),
        }
    }

    pub fn write_sample(path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(&Self::sample())?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
