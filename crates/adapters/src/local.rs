// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The local (non-cluster) job backend.
//!
//! Grounded on `simon/cluster/local.py::LocalJobManager`: there is no
//! external queue to requeue into, so `requeue_job` is a no-op; compression
//! runs as a backgrounded `sh` script, and the liveness of an in-progress
//! claim is checked with `ps --pid <pid>`.

use std::fs;
use std::path::PathBuf;

use tracing::{info, instrument};

use crate::backend::JobBackend;
use crate::error::AdapterError;
use crate::process;

const COMPRESS_SCRIPT_NAME: &str = "TEMPORARY__COMPRESS__SCRIPT.sh";

pub struct LocalBackend {
    case_dir: PathBuf,
}

impl LocalBackend {
    pub fn new(case_dir: impl Into<PathBuf>) -> Self {
        Self { case_dir: case_dir.into() }
    }

    fn verify_compress_inputs(&self, archive_name: &str, files: &[String]) -> Result<(), AdapterError> {
        verify_compress_inputs(&self.case_dir, archive_name, files)
    }

    fn is_pid_alive(pid: &str) -> bool {
        let Ok(output) = process::run_capturing_stdout(&format!("ps --pid {pid} | grep ^{pid}")) else {
            return false;
        };
        !output.trim().is_empty()
    }

    fn compress_is_running(&self, archive_name: &str) -> bool {
        if self.case_dir.join(format!("{archive_name}.queued")).is_file() {
            return true;
        }
        let Ok(entries) = fs::read_dir(&self.case_dir) else {
            return false;
        };
        let prefix = format!("{archive_name}.inprogress.");
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(pid) = name.strip_prefix(&prefix) {
                if Self::is_pid_alive(pid) {
                    return true;
                }
            }
        }
        false
    }
}

/// Shared between [`LocalBackend`] and tests: common input validation for
/// `compress`.
pub(crate) fn verify_compress_inputs(
    case_dir: &std::path::Path,
    archive_name: &str,
    files: &[String],
) -> Result<(), AdapterError> {
    if archive_name.is_empty() {
        return Err(AdapterError::InvalidArchiveRequest("no output archive name specified".into()));
    }
    if archive_name.contains(char::is_whitespace) {
        return Err(AdapterError::InvalidArchiveRequest(format!(
            "no whitespace allowed in archive names ({archive_name})"
        )));
    }
    if files.is_empty() {
        return Err(AdapterError::InvalidArchiveRequest("no files to compress".into()));
    }
    for f in files {
        if f.contains(char::is_whitespace) {
            return Err(AdapterError::InvalidArchiveRequest(format!("no whitespace allowed in file names ({f})")));
        }
        if !case_dir.join(f).is_file() {
            return Err(AdapterError::InvalidArchiveRequest(format!("file {f} not found")));
        }
    }
    Ok(())
}

impl JobBackend for LocalBackend {
    #[instrument(skip(self))]
    fn requeue_job(&mut self) -> Result<(), AdapterError> {
        info!("local backend has no external queue; requeue is a no-op");
        Ok(())
    }

    #[instrument(skip(self, files))]
    fn compress(&mut self, archive_name: &str, files: &[String]) -> Result<(), AdapterError> {
        self.verify_compress_inputs(archive_name, files)?;
        let archive_path = self.case_dir.join(archive_name);
        if archive_path.is_file() {
            return Ok(());
        }
        if self.compress_is_running(archive_name) {
            return Ok(());
        }

        let mut tar_command = format!("tar -czvf {archive_name}.inprogress.$$");
        for f in files {
            tar_command.push(' ');
            tar_command.push_str(f);
        }
        let compress_command = [
            format!("mv {archive_name}.queued {archive_name}.inprogress.$$"),
            tar_command,
            format!("mv {archive_name}.inprogress.$$ {archive_name}"),
            format!("echo Done compressing {archive_name}!"),
        ]
        .join(" && ");

        let script_path = self.case_dir.join(COMPRESS_SCRIPT_NAME);
        fs::write(&script_path, &compress_command)?;

        let cwd = std::env::current_dir()?;
        let command = format!(
            "cd {case_dir} && touch {archive_name}.queued && sh {script} &\ncd {cwd}",
            case_dir = self.case_dir.display(),
            script = COMPRESS_SCRIPT_NAME,
            cwd = cwd.display(),
        );
        process::run_blocking(&command)?;
        let _ = fs::remove_file(&script_path);
        info!(archive_name, "submitted local compression job");
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
