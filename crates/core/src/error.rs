// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds shared across the core primitives.

use thiserror::Error;

/// Errors raised by [`crate::timestep`], [`crate::priority_queue`], and
/// [`crate::task`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid decimal argument {value:?}: {reason}")]
    InvalidArgument { value: String, reason: String },

    #[error("priority must be non-negative, got {0}")]
    NegativePriority(i64),

    #[error("pop from empty priority queue")]
    PopEmpty,
}
