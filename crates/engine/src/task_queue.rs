// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded-concurrency task scheduler.
//!
//! Grounded on `simon/taskqueue.py::TaskQueue`: keeps up to `capacity`
//! Tasks running, drains completed ones, and promotes pending work out of
//! a [`PriorityQueue`] by priority, FIFO within a tie.

use tracing::debug;
use tstep_core::{PriorityQueue, Task};

use crate::error::EngineError;

pub struct TaskQueue {
    capacity: usize,
    running: Vec<Task>,
    pending: PriorityQueue<Task>,
}

impl TaskQueue {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, running: Vec::new(), pending: PriorityQueue::new() }
    }

    /// Enqueues each task by its priority, then immediately calls
    /// [`Self::update`].
    pub fn add(&mut self, tasks: Vec<Task>) -> Result<(), EngineError> {
        for task in tasks {
            let priority = task.priority() as i64;
            self.pending.add(task, priority)?;
        }
        self.update();
        Ok(())
    }

    /// (1) drops any running task whose `is_complete()` now holds,
    /// success/failure are not otherwise reacted to here (spec.md §4.4,
    /// §7); (2) promotes pending tasks until capacity is filled or the
    /// pending queue empties. A spawn failure is logged, not propagated —
    /// the next `plan()` cycle will re-derive and re-issue the same work.
    pub fn update(&mut self) {
        self.running.retain_mut(|task| !task.is_complete());
        while self.running.len() < self.capacity {
            let Ok(mut task) = self.pending.pop() else {
                break;
            };
            if let Err(error) = task.run() {
                debug!(%error, label = task.label(), "failed to spawn task");
            }
            self.running.push(task);
        }
    }

    pub fn len(&self) -> usize {
        self.running.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }
}

#[cfg(test)]
#[path = "task_queue_tests.rs"]
mod tests;
