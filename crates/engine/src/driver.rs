// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties [`FileState`], [`Listener`], and [`TaskQueue`] into the two modes
//! a manager process runs in.
//!
//! Grounded on `simon/openfoam/listener.py::OFListener.get_cleanup_tasks` /
//! `ensure_case_correctness` for `setup`, and on spec.md §4.6 for the
//! `monitor` loop shape. The shell commands each `PlannedTask` lowers to
//! are the same ones the `_create_*_task` helpers in that file build.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};
use tstep_adapters::JobBackend;
use tstep_core::{Sleeper, Task, Timestep};

use crate::error::EngineError;
use crate::file_state::{FileState, RECONSTRUCTION_DONE_MARKER_FILENAME};
use crate::listener::{Listener, PlannedTask};
use crate::task_queue::TaskQueue;

pub struct Driver<B: JobBackend, S: Sleeper> {
    case_dir: PathBuf,
    listener: Listener<B>,
    num_simultaneous_tasks: usize,
    task_queue: TaskQueue,
    sleeper: S,
    sleep_time_per_update: Duration,
    /// `None` disables periodic re-planning; a running monitor loop then
    /// only drains whatever is already queued.
    recheck_every_num_updates: Option<u32>,
}

impl<B: JobBackend, S: Sleeper> Driver<B, S> {
    pub fn new(
        case_dir: impl Into<PathBuf>,
        listener: Listener<B>,
        num_simultaneous_tasks: usize,
        sleeper: S,
        sleep_time_per_update: Duration,
        recheck_every_num_updates: Option<u32>,
    ) -> Self {
        Self {
            case_dir: case_dir.into(),
            listener,
            num_simultaneous_tasks,
            task_queue: TaskQueue::new(num_simultaneous_tasks),
            sleeper,
            sleep_time_per_update,
            recheck_every_num_updates,
        }
    }

    /// Cleans up incomplete split/reconstructed state left by a crash,
    /// then seeds the producer from whatever valid state survives.
    /// Returns [`EngineError::UnrecoverableSetup`] if the directory is
    /// still dirty after cleanup, or if no split/reconstructed/tarred
    /// state exists to restart the producer from.
    pub fn setup(&mut self) -> Result<(), EngineError> {
        let state = FileState::new(&self.case_dir)?;
        let cleanup = self.cleanup_tasks(&state)?;
        self.run_to_completion(cleanup)?;

        let state = FileState::new(&self.case_dir)?;
        if !self.cleanup_tasks(&state)?.is_empty() {
            return Err(EngineError::UnrecoverableSetup);
        }
        self.ensure_case_correctness(&state)
    }

    /// §7 cleanup protocol: walk split times newest-to-oldest, attempting
    /// reassembly inline; a failed attempt schedules that split for
    /// deletion instead. Any top-level numbered directory still missing
    /// its marker is also scheduled for deletion.
    fn cleanup_tasks(&self, state: &FileState) -> Result<Vec<Task>, EngineError> {
        let mut tasks = Vec::new();
        for t in state.split_times().iter().rev() {
            let mut reconstruct = build_reconstruct_task(&self.case_dir, t);
            reconstruct.run_blocking()?;
            if reconstruct.was_successful() != Some(true) {
                tasks.push(build_delete_split_task(&self.case_dir, t));
            }
        }
        for t in state.reconstructed_dir_candidates() {
            if !state.is_reconstructed(t.as_str()) {
                tasks.push(build_delete_reconstructed_task(&self.case_dir, &t));
            }
        }
        Ok(tasks)
    }

    fn ensure_case_correctness(&self, state: &FileState) -> Result<(), EngineError> {
        if !state.split_times().is_empty() {
            info!("found valid split times, ready to proceed");
            return Ok(());
        }
        info!("no split times left, deleting processor directories");
        let mut cleanup = Task::new(format!("rm -rf {}/processor*", self.case_dir.display()));
        cleanup.run_blocking()?;

        if !state.reconstructed_times().is_empty() {
            info!("found reconstructed times, ready to proceed");
            return Ok(());
        }

        let tarred_times = state.tarred_times();
        let Some(newest) = tarred_times.last() else {
            return Err(EngineError::UnrecoverableSetup);
        };
        info!(timestep = %newest, "restoring a reconstructed time from the newest tar");
        let mut restore = build_untar_and_mark_task(&self.case_dir, newest);
        restore.run_blocking()?;
        Ok(())
    }

    fn run_to_completion(&mut self, tasks: Vec<Task>) -> Result<(), EngineError> {
        let mut queue = TaskQueue::new(self.num_simultaneous_tasks);
        queue.add(tasks)?;
        while !queue.is_empty() {
            self.sleeper.sleep(self.sleep_time_per_update);
            queue.update();
        }
        Ok(())
    }

    /// Runs indefinitely, polling the queue and re-planning every
    /// `recheck_every_num_updates` iterations. `once` runs exactly one
    /// plan-and-drain cycle and returns, regardless of the recheck
    /// setting — a debugging aid with the same code path as indefinite
    /// monitoring.
    pub fn monitor(&mut self, once: bool) -> Result<(), EngineError> {
        let mut updates = 0u32;
        loop {
            self.task_queue.update();
            self.sleeper.sleep(self.sleep_time_per_update);
            updates += 1;

            let should_replan = once || self.recheck_every_num_updates.is_some_and(|n| n != 0 && updates % n == 0);
            if should_replan {
                self.replan()?;
            }

            if once {
                return Ok(());
            }
            if self.recheck_every_num_updates.is_none() && self.task_queue.is_empty() {
                return Ok(());
            }
        }
    }

    fn replan(&mut self) -> Result<(), EngineError> {
        let state = FileState::new(&self.case_dir)?;
        let planned = self.listener.plan(&state)?;
        let tasks: Vec<Task> = planned.iter().map(|p| to_task(&self.case_dir, p)).collect();
        debug!(count = tasks.len(), "enqueueing planned tasks");
        self.task_queue.add(tasks)
    }
}

fn to_task(case_dir: &Path, planned: &PlannedTask) -> Task {
    match planned {
        PlannedTask::Reconstruct(t) => build_reconstruct_task(case_dir, t),
        PlannedTask::DeleteSplit(t) => build_delete_split_task(case_dir, t),
        PlannedTask::Tar(t) => build_tar_task(case_dir, t),
        PlannedTask::DeleteReconstructed(t) => build_delete_reconstructed_task(case_dir, t),
        PlannedTask::DeleteTar(t) => build_delete_tar_task(case_dir, t),
    }
}

fn build_reconstruct_task(case_dir: &Path, t: &Timestep) -> Task {
    let mut reconstruct_command = format!("reconstructPar -time {t}");
    if case_dir != Path::new(".") {
        reconstruct_command.push_str(&format!(" -case {}", case_dir.display()));
    }
    if t.as_str() == "0" {
        reconstruct_command.push_str(" -withZero");
    }
    let marker = case_dir.join(t.as_str()).join(RECONSTRUCTION_DONE_MARKER_FILENAME);
    let command = format!("{reconstruct_command} && touch {}", marker.display());
    Task::new(command).with_priority(2).with_label(format!("Reconstruct {t}"))
}

fn build_delete_split_task(case_dir: &Path, t: &Timestep) -> Task {
    let command = format!("rm -rf {}/processor*/{t}", case_dir.display());
    Task::new(command).with_priority(0).with_label(format!("DeleteSplit {t}"))
}

fn build_delete_reconstructed_task(case_dir: &Path, t: &Timestep) -> Task {
    let command = format!("rm -rf {}/{t}", case_dir.display());
    Task::new(command).with_priority(0).with_label(format!("DeleteReconstructed {t}"))
}

fn build_tar_task(case_dir: &Path, t: &Timestep) -> Task {
    let marker = case_dir.join(t.as_str()).join(RECONSTRUCTION_DONE_MARKER_FILENAME);
    let in_progress = format!("{}/{t}.tar.inprogress", case_dir.display());
    let sealed = format!("{}/{t}.tar", case_dir.display());
    let source = format!("{}/{t}", case_dir.display());
    let command = format!(
        "tar --exclude {} -cvf {in_progress} {source} && mv {in_progress} {sealed}",
        marker.display()
    );
    Task::new(command).with_priority(1).with_label(format!("Tar {t}"))
}

fn build_delete_tar_task(case_dir: &Path, t: &Timestep) -> Task {
    let command = format!("rm {}/{t}.tar", case_dir.display());
    Task::new(command).with_priority(4).with_label(format!("DeleteTar {t}"))
}

fn build_untar_and_mark_task(case_dir: &Path, t: &Timestep) -> Task {
    let tar_path = case_dir.join(format!("{t}.tar"));
    let untar_command = format!("tar -xvf {} --directory={}", tar_path.display(), case_dir.display());
    let marker = case_dir.join(t.as_str()).join(RECONSTRUCTION_DONE_MARKER_FILENAME);
    let command = format!("{untar_command} && touch {}", marker.display());
    Task::new(command).with_label(format!("RestoreFromTar {t}"))
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
