// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A runnable unit of external work.
//!
//! Grounded on `simon/task.py`: a `Task` wraps a shell command, an optional
//! completion predicate, and (once run) a child process handle. It carries
//! no retry policy of its own — retry is the scheduler's prerogative
//! (spec.md §4.3).

use std::fmt;
use std::process::{Child, Command, Stdio};

/// A parameterless boolean probe used instead of (or in addition to) child
/// process exit status to decide completion.
pub type CompletionPredicate = Box<dyn Fn() -> bool + Send>;

pub struct Task {
    command: String,
    priority: u32,
    label: String,
    completion_predicate: Option<CompletionPredicate>,
    child: Option<Child>,
}

impl Task {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            priority: 0,
            label: String::new(),
            completion_predicate: None,
            child: None,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_completion_predicate(mut self, predicate: CompletionPredicate) -> Self {
        self.completion_predicate = Some(predicate);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn label(&self) -> &str {
        if self.label.is_empty() {
            &self.command
        } else {
            &self.label
        }
    }

    /// Spawn the command as an external child process, unless it's already
    /// complete. stdout is discarded; stderr is inherited so it surfaces in
    /// the manager's own log for eventual reaping.
    pub fn run(&mut self) -> std::io::Result<()> {
        if self.is_complete() {
            return Ok(());
        }
        let child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()?;
        self.child = Some(child);
        Ok(())
    }

    /// Spawn and block until the command exits.
    pub fn run_blocking(&mut self) -> std::io::Result<()> {
        if self.is_complete() {
            return Ok(());
        }
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()?;
        child.wait()?;
        self.child = Some(child);
        Ok(())
    }

    /// True if the completion predicate fires, or a spawned child has
    /// exited.
    pub fn is_complete(&mut self) -> bool {
        if let Some(predicate) = &self.completion_predicate {
            if predicate() {
                return true;
            }
        }
        match &mut self.child {
            None => false,
            Some(child) => matches!(child.try_wait(), Ok(Some(_))),
        }
    }

    /// Tri-state: `None` if not yet complete, `Some(true)`/`Some(false)` for
    /// a completed child's exit status, `Some(true)` if completion came from
    /// the predicate with no child ever spawned.
    pub fn was_successful(&mut self) -> Option<bool> {
        if !self.is_complete() {
            return None;
        }
        match &mut self.child {
            Some(child) => match child.try_wait() {
                Ok(Some(status)) => Some(status.success()),
                _ => Some(true),
            },
            None => Some(true),
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("command", &self.command)
            .field("priority", &self.priority)
            .field("label", &self.label())
            .finish()
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.command == other.command
    }
}

impl Eq for Task {}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
