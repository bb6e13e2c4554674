// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The planner: turns an observed [`FileState`] into the ordered set of
//! tasks that should run next, and drives the `JobBackend` out-of-band for
//! producer requeueing and compressed-group submission.
//!
//! Grounded on `simon/openfoam/listener.py::OFListener`. The four passes
//! below (split, reconstructed, tarred, compressed) mirror
//! `_process_split_times` / `_process_reconstructed_times` /
//! `_process_tarred_times` / `_process_compressed_files` in that order.

use std::collections::HashSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{info, info_span};
use tstep_adapters::JobBackend;
use tstep_core::Timestep;

use crate::error::EngineError;
use crate::file_state::FileState;

/// One unit of work the Listener has decided should run, in priority
/// order (lower runs first): `DeleteSplit` and `DeleteReconstructed` = 0,
/// `Tar` = 1, `Reconstruct` = 2, `DeleteTar` = 4 (spec.md §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedTask {
    Reconstruct(Timestep),
    DeleteSplit(Timestep),
    Tar(Timestep),
    DeleteReconstructed(Timestep),
    DeleteTar(Timestep),
}

impl PlannedTask {
    pub fn priority(&self) -> i64 {
        match self {
            PlannedTask::DeleteSplit(_) => 0,
            PlannedTask::DeleteReconstructed(_) => 0,
            PlannedTask::Tar(_) => 1,
            PlannedTask::Reconstruct(_) => 2,
            PlannedTask::DeleteTar(_) => 4,
        }
    }

    pub fn timestep(&self) -> &Timestep {
        match self {
            PlannedTask::Reconstruct(t)
            | PlannedTask::DeleteSplit(t)
            | PlannedTask::Tar(t)
            | PlannedTask::DeleteReconstructed(t)
            | PlannedTask::DeleteTar(t) => t,
        }
    }
}

pub struct Listener<B: JobBackend> {
    keep_every: Decimal,
    compress_every: Decimal,
    backend: B,
    requeue: bool,
    has_requeued_producer: bool,
    scheduled_for_split_delete: HashSet<String>,
    scheduled_for_reconstructed_delete: HashSet<String>,
    requested_compressed_groups: HashSet<String>,
}

impl<B: JobBackend> Listener<B> {
    pub fn new(keep_every: Decimal, compress_every: Decimal, backend: B, requeue: bool) -> Result<Self, EngineError> {
        verify_frequencies(keep_every, compress_every)?;
        Ok(Self {
            keep_every,
            compress_every,
            backend,
            requeue,
            has_requeued_producer: false,
            scheduled_for_split_delete: HashSet::new(),
            scheduled_for_reconstructed_delete: HashSet::new(),
            requested_compressed_groups: HashSet::new(),
        })
    }

    pub fn keep_every(&self) -> Decimal {
        self.keep_every
    }

    pub fn compress_every(&self) -> Decimal {
        self.compress_every
    }

    /// Re-validates the pair atomically before accepting new frequencies
    /// (spec.md §4.2).
    pub fn update_processing_frequencies(&mut self, keep_every: Decimal, compress_every: Decimal) -> Result<(), EngineError> {
        verify_frequencies(keep_every, compress_every)?;
        self.keep_every = keep_every;
        self.compress_every = compress_every;
        Ok(())
    }

    /// Executes Passes A-D against `state` and returns the ordered list of
    /// new Tasks. Side effects (requeue, compress submission) are invoked
    /// directly on the backend rather than represented as Tasks, since the
    /// core never blocks on them (spec.md §2).
    pub fn plan(&mut self, state: &FileState) -> Result<Vec<PlannedTask>, EngineError> {
        let _span = info_span!("plan").entered();
        let mut tasks = Vec::new();

        let split_times = state.split_times();
        self.process_split_times(&split_times, state, &mut tasks)?;

        let reconstructed_times = state.reconstructed_times();
        self.process_reconstructed_times(&reconstructed_times, &split_times, state, &mut tasks);

        let tarred_times = state.tarred_times();
        self.process_tarred_times(&tarred_times, &mut tasks);
        self.plan_compressed_groups(&tarred_times, state)?;

        self.process_compressed_coverage(&tarred_times, state, &mut tasks);

        info!(emitted = tasks.len(), "plan produced tasks");
        Ok(tasks)
    }

    /// Pass A: for every split time but the last (presumed still being
    /// written by the producer), decide DeleteSplit vs Reconstruct.
    fn process_split_times(
        &mut self,
        split_times: &[Timestep],
        state: &FileState,
        tasks: &mut Vec<PlannedTask>,
    ) -> Result<(), EngineError> {
        let Some((_, candidates)) = split_times.split_last() else {
            return Ok(());
        };
        for t in candidates {
            let key = t.as_str().to_string();
            if self.scheduled_for_split_delete.contains(&key) {
                continue;
            }
            if !self.is_kept(t) {
                tasks.push(PlannedTask::DeleteSplit(t.clone()));
                self.scheduled_for_split_delete.insert(key);
            } else if state.is_reconstructed(t.as_str()) || state.is_tarred(t.as_str()) {
                tasks.push(PlannedTask::DeleteSplit(t.clone()));
                self.scheduled_for_split_delete.insert(key);
            } else {
                tasks.push(PlannedTask::Reconstruct(t.clone()));
                self.scheduled_for_split_delete.insert(key);
                if self.requeue && !self.has_requeued_producer {
                    self.backend
                        .requeue_job()
                        .map_err(|e| EngineError::BackendUnavailable(e.to_string()))?;
                    self.has_requeued_producer = true;
                }
            }
        }
        Ok(())
    }

    /// The keep-divisibility rule: T is kept iff `T / keep_every` has no
    /// fractional part. T = "0" is always treated as non-kept (spec.md
    /// §3/§4.2).
    fn is_kept(&self, t: &Timestep) -> bool {
        if t.as_str() == "0" {
            return false;
        }
        t.is_multiple_of(self.keep_every)
    }

    /// Pass B: tar every reconstructed time not yet tarred; delete its
    /// split directory once the producer has moved past it. Tar is
    /// reissued every cycle until `is_tarred` goes true — there is no
    /// in-memory guard on it, only on DeleteSplit, which Pass A may have
    /// already emitted for this same T.
    fn process_reconstructed_times(
        &mut self,
        reconstructed_times: &[Timestep],
        split_times: &[Timestep],
        state: &FileState,
        tasks: &mut Vec<PlannedTask>,
    ) {
        let last_split = split_times.last();
        for t in reconstructed_times {
            if !state.is_tarred(t.as_str()) {
                tasks.push(PlannedTask::Tar(t.clone()));
            }
            if last_split.is_some_and(|last| last != t) {
                let key = t.as_str().to_string();
                if !self.scheduled_for_split_delete.contains(&key) {
                    tasks.push(PlannedTask::DeleteSplit(t.clone()));
                    self.scheduled_for_split_delete.insert(key);
                }
            }
        }
    }

    /// Pass C: every tarred time gets its reconstructed directory deleted
    /// exactly once.
    fn process_tarred_times(&mut self, tarred_times: &[Timestep], tasks: &mut Vec<PlannedTask>) {
        for t in tarred_times {
            let key = t.as_str().to_string();
            if self.scheduled_for_reconstructed_delete.contains(&key) {
                continue;
            }
            tasks.push(PlannedTask::DeleteReconstructed(t.clone()));
            self.scheduled_for_reconstructed_delete.insert(key);
        }
    }

    /// Pass D: every tarred time already covered by a sealed compressed
    /// group gets its tar deleted. No separate bookkeeping set is needed:
    /// once the tar is actually removed, `tarred_times()` stops reporting
    /// it (spec.md §4.2 Pass D).
    fn process_compressed_coverage(&self, tarred_times: &[Timestep], state: &FileState, tasks: &mut Vec<PlannedTask>) {
        for t in tarred_times {
            if state.is_compressed(t.as_str()) {
                tasks.push(PlannedTask::DeleteTar(t.clone()));
            }
        }
    }

    /// §4.2.1: walk the sorted tarred times in fixed-size `compress_every`
    /// windows, requesting a compressed group for each window that's
    /// completely filled. Gaps simply never reach the required count and
    /// are silently skipped.
    fn plan_compressed_groups(&mut self, tarred_times: &[Timestep], state: &FileState) -> Result<(), EngineError> {
        let group_size = group_size(self.keep_every, self.compress_every)?;
        if tarred_times.len() < group_size {
            return Ok(());
        }
        let t0 = tarred_times.first().expect("checked non-empty above").value();

        let mut window_index = (t0 / self.compress_every).floor();
        let mut window_start = window_index * self.compress_every;
        let mut window_end = window_start + self.compress_every;
        let mut candidate: Vec<&Timestep> = Vec::new();

        for t in tarred_times {
            if t.value() < window_start {
                continue;
            }
            while t.value() >= window_end {
                window_index += Decimal::ONE;
                window_start = window_index * self.compress_every;
                window_end = window_start + self.compress_every;
                candidate.clear();
            }
            candidate.push(t);
            if candidate.len() == group_size {
                self.request_compressed_group(&candidate, state)?;
                candidate.clear();
            }
        }
        Ok(())
    }

    fn request_compressed_group(&mut self, candidate: &[&Timestep], state: &FileState) -> Result<(), EngineError> {
        let start = candidate.first().expect("group is non-empty").as_str();
        let end = candidate.last().expect("group is non-empty").as_str();
        let step = self.keep_every.to_string();
        let filename = FileState::create_compressed_filename(start, end, &step)?;
        if self.requested_compressed_groups.contains(&filename) {
            return Ok(());
        }
        if state.is_compressed_file(&filename) {
            return Ok(());
        }
        let files: Vec<String> = candidate.iter().map(|t| format!("{t}.tar")).collect();
        self.backend
            .compress(&filename, &files)
            .map_err(|e| EngineError::BackendUnavailable(e.to_string()))?;
        self.requested_compressed_groups.insert(filename);
        Ok(())
    }
}

fn verify_frequencies(keep_every: Decimal, compress_every: Decimal) -> Result<(), EngineError> {
    if keep_every <= Decimal::ZERO {
        return Err(EngineError::InvalidConfiguration(format!("keep_every ({keep_every}) must be positive")));
    }
    if compress_every <= keep_every || compress_every % keep_every != Decimal::ZERO {
        return Err(EngineError::InvalidConfiguration(format!(
            "compress_every ({compress_every}) must be a strict positive multiple of keep_every ({keep_every})"
        )));
    }
    Ok(())
}

fn group_size(keep_every: Decimal, compress_every: Decimal) -> Result<usize, EngineError> {
    let quotient = compress_every / keep_every;
    quotient
        .to_usize()
        .ok_or_else(|| EngineError::InvalidConfiguration(format!("compress_every / keep_every ({quotient}) does not fit a group size")))
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
