// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

use tstep_engine::EngineError;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// SPEC_FULL.md §7's exit code table.
impl From<EngineError> for ExitError {
    fn from(error: EngineError) -> Self {
        let code = match &error {
            EngineError::InvalidCaseDir(_) => 2,
            EngineError::InvalidConfiguration(_) => 3,
            EngineError::InvalidArgument(_) => 4,
            EngineError::BackendUnavailable(_) => 5,
            EngineError::UnrecoverableSetup => 6,
            EngineError::NotFound(_) | EngineError::Io(_) => 1,
        };
        Self::new(code, error.to_string())
    }
}
