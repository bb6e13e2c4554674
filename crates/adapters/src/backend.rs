// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pluggable job-control capability the Listener drives out-of-band.
//!
//! Grounded on `simon`'s `ExternalJobManager` protocol
//! (`simon/openfoam/listener.py`) and its two concrete backends under
//! `simon/cluster/`. The core treats every call here as asynchronous: it
//! never blocks on submission and re-derives truth from the filesystem on
//! the next polling cycle (spec.md §4.5).

use crate::error::AdapterError;

/// Requeue the producing job, and submit long-running compression of a
/// group of sealed tars.
pub trait JobBackend {
    /// Instruct the external scheduler to enqueue a successor run of the
    /// producing job that starts after the current one ends. A no-op on a
    /// backend with no queue (e.g. local). Must be idempotent within one
    /// process lifetime; the Listener additionally guards this with its own
    /// flag.
    fn requeue_job(&mut self) -> Result<(), AdapterError>;

    /// Submit a job that tars+gzips `files` into `archive_name`, going
    /// through the `.queued` -> `.inprogress.<id>` -> final-name commit
    /// sequence. Refuses if `archive_name` already exists, is already
    /// queued, or has a live in-progress claim.
    fn compress(&mut self, archive_name: &str, files: &[String]) -> Result<(), AdapterError>;
}
