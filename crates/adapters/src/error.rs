// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds surfaced by the job backends.

use thiserror::Error;
use tstep_core::CoreError;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    InvalidArgument(#[from] CoreError),

    #[error("{0}")]
    InvalidArchiveRequest(String),

    #[error("backend job submission failed: {0}")]
    SubmissionFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
