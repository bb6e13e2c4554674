// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Slurm job backend.
//!
//! Grounded on `simon/cluster/slurm.py::SlurmJobManager`: requeuing submits
//! a dependent `sbatch` run after verifying the job script's declared name
//! hasn't drifted since construction; compression fills a template sfile
//! and submits it, and liveness of an `.inprogress.<job_id>` claim is
//! checked with `squeue`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::backend::JobBackend;
use crate::error::AdapterError;
use crate::local::verify_compress_inputs;
use crate::process;

pub struct SlurmBackend {
    case_dir: PathBuf,
    job_sfile: String,
    job_id: String,
    compress_sfile_template: String,
    job_name: String,
}

impl SlurmBackend {
    /// Validates that `job_sfile` and `compress_sfile_template` exist in
    /// the case directory and reads the job name out of the sbatch
    /// script's `#SBATCH -J <name>` directive, so later `requeue_job`
    /// calls can detect the sfile having drifted underneath this backend.
    pub fn new(
        case_dir: impl Into<PathBuf>,
        job_sfile: impl Into<String>,
        job_id: impl Into<String>,
        compress_sfile_template: impl Into<String>,
    ) -> Result<Self, AdapterError> {
        let case_dir = case_dir.into();
        let job_sfile = job_sfile.into();
        let compress_sfile_template = compress_sfile_template.into();
        if !case_dir.join(&job_sfile).is_file() {
            return Err(AdapterError::InvalidArchiveRequest(format!(
                "{} does not contain {job_sfile}",
                case_dir.display()
            )));
        }
        if !case_dir.join(&compress_sfile_template).is_file() {
            return Err(AdapterError::InvalidArchiveRequest(format!(
                "{} does not contain {compress_sfile_template}",
                case_dir.display()
            )));
        }
        let job_name = read_job_name(&case_dir.join(&job_sfile))?;
        Ok(Self { case_dir, job_sfile, job_id: job_id.into(), compress_sfile_template, job_name })
    }

    fn job_status(job_id: &str) -> Result<String, AdapterError> {
        let output = process::run_capturing_stdout(&format!("squeue --me --jobs={job_id} -o '%i %j %T'"))?;
        let lines: Vec<&str> = output.lines().filter(|l| !l.is_empty()).collect();
        if lines.len() <= 1 {
            return Ok("JOB_NOT_FOUND".to_string());
        }
        Ok(lines[1].split_whitespace().nth(2).unwrap_or("JOB_NOT_FOUND").to_string())
    }
}

fn read_job_name(job_sfile_path: &Path) -> Result<String, AdapterError> {
    let contents = fs::read_to_string(job_sfile_path)?;
    for line in contents.lines() {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix("#SBATCH") else {
            continue;
        };
        let rest = rest.trim();
        if let Some(name) = rest.strip_prefix("-J") {
            let name = name.trim();
            if !name.is_empty() {
                return Ok(name.to_string());
            }
        }
    }
    Err(AdapterError::InvalidArchiveRequest(format!("unable to find job name in {}", job_sfile_path.display())))
}

impl JobBackend for SlurmBackend {
    #[instrument(skip(self))]
    fn requeue_job(&mut self) -> Result<(), AdapterError> {
        let sfile_path = self.case_dir.join(&self.job_sfile);
        if !sfile_path.is_file() {
            return Err(AdapterError::InvalidArchiveRequest(format!("sfile {} does not exist", self.job_sfile)));
        }
        let current_name = read_job_name(&sfile_path)?;
        if current_name != self.job_name {
            return Err(AdapterError::InvalidArchiveRequest(format!(
                "the job name in the sfile ({current_name}) does not match what this backend was started with ({})",
                self.job_name
            )));
        }
        let cwd = std::env::current_dir()?;
        let command = format!(
            "cd {case_dir} && sbatch --parsable -d afterany:{job_id} {job_sfile} && cd {cwd}",
            case_dir = self.case_dir.display(),
            job_id = self.job_id,
            job_sfile = self.job_sfile,
            cwd = cwd.display(),
        );
        process::run_blocking(&command)?;
        info!(job_id = %self.job_id, "requeued producer job");
        Ok(())
    }

    #[instrument(skip(self, files))]
    fn compress(&mut self, archive_name: &str, files: &[String]) -> Result<(), AdapterError> {
        verify_compress_inputs(&self.case_dir, archive_name, files)?;
        if !self.case_dir.join(&self.compress_sfile_template).is_file() {
            return Err(AdapterError::InvalidArchiveRequest(format!(
                "sfile {} does not exist",
                self.compress_sfile_template
            )));
        }
        if self.case_dir.join(format!("{archive_name}.queued")).is_file() {
            return Ok(());
        }
        let prefix = format!("{archive_name}.inprogress.");
        if let Ok(entries) = fs::read_dir(&self.case_dir) {
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().into_owned();
                if let Some(job_id) = name.strip_prefix(&prefix) {
                    if Self::job_status(job_id)? != "JOB_NOT_FOUND" {
                        return Ok(());
                    }
                }
            }
        }
        if self.case_dir.join(archive_name).is_file() {
            return Ok(());
        }

        let mut tar_command = format!("tar -czvf {archive_name}.inprogress.$SLURM_JOB_ID");
        for f in files {
            tar_command.push(' ');
            tar_command.push_str(f);
        }
        let compress_command = [
            format!("mv {archive_name}.queued {archive_name}.inprogress.$SLURM_JOB_ID"),
            tar_command,
            format!("mv {archive_name}.inprogress.$SLURM_JOB_ID {archive_name}"),
            format!("echo Done compressing {archive_name}!"),
        ]
        .join(" && ");

        let filled_name = format!("{}.filled", self.compress_sfile_template);
        let filled_path = self.case_dir.join(&filled_name);
        fs::copy(self.case_dir.join(&self.compress_sfile_template), &filled_path)?;
        let mut contents = fs::read_to_string(&filled_path)?;
        contents.push_str("\n\n");
        contents.push_str(&compress_command);
        fs::write(&filled_path, contents)?;

        let command = format!(
            "cd {case_dir} && touch {archive_name}.queued && sbatch {filled_name}",
            case_dir = self.case_dir.display(),
        );
        process::run_blocking(&command)?;
        let _ = fs::remove_file(&filled_path);
        info!(archive_name, "submitted slurm compression job");
        Ok(())
    }
}

#[cfg(test)]
#[path = "slurm_tests.rs"]
mod tests;
