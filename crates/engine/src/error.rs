// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds surfaced by the engine.

use std::path::PathBuf;

use thiserror::Error;
use tstep_core::CoreError;

/// Errors raised by [`crate::file_state`], [`crate::listener`],
/// [`crate::task_queue`], and [`crate::driver`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0:?} does not appear to be a valid OpenFOAM case directory (missing constant/, system/, or processor0/)")]
    InvalidCaseDir(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    InvalidArgument(#[from] CoreError),

    #[error("required input not found: {0}")]
    NotFound(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("setup could not find split, reconstructed, or tarred state to seed the producer from")]
    UnrecoverableSetup,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
