// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared shell-spawn helpers for the concrete job backends.

use std::process::Command;

use crate::error::AdapterError;

/// Run a shell command and wait for it, returning whether it exited
/// successfully.
pub fn run_blocking(command: &str) -> Result<bool, AdapterError> {
    let status = Command::new("sh").arg("-c").arg(command).status()?;
    Ok(status.success())
}

/// Run a shell command and capture its stdout, used for liveness queries
/// (`ps`, `squeue`).
pub fn run_capturing_stdout(command: &str) -> Result<String, AdapterError> {
    let output = Command::new("sh").arg("-c").arg(command).output()?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
