// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only view over a case directory: derives per-timestep lifecycle
//! stage from nothing but what's on disk.
//!
//! Grounded on `simon/openfoam/file_state.py`: every method here is a pure
//! read — no caching, no memory of past observations — so that the engine's
//! only authoritative state is the filesystem itself.

use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tstep_core::timestep::{self, parse_compressed_filename};
use tstep_core::Timestep;

use crate::error::EngineError;

pub const RECONSTRUCTION_DONE_MARKER_FILENAME: &str = ".__reconstruction_done";

pub struct FileState {
    case_dir: PathBuf,
}

impl FileState {
    /// Validates `constant/`, `system/`, and `processor0/` exist before
    /// accepting the directory as a case directory (spec.md §4.1).
    pub fn new(case_dir: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let case_dir = case_dir.into();
        if !Self::is_valid_case_dir(&case_dir) {
            return Err(EngineError::InvalidCaseDir(case_dir));
        }
        Ok(Self { case_dir })
    }

    fn is_valid_case_dir(case_dir: &Path) -> bool {
        case_dir.join("constant").is_dir()
            && case_dir.join("system").is_dir()
            && case_dir.join("processor0").is_dir()
    }

    pub fn case_dir(&self) -> &Path {
        &self.case_dir
    }

    /// Ascending list of T derived from `processor0/`'s numbered
    /// subdirectories.
    pub fn split_times(&self) -> Vec<Timestep> {
        let mut times = numbered_subdirs(&self.case_dir.join("processor0"));
        times.sort();
        times
    }

    /// Ascending list of T whose top-level reconstruction marker exists.
    pub fn reconstructed_times(&self) -> Vec<Timestep> {
        let mut times: Vec<Timestep> = numbered_subdirs(&self.case_dir)
            .into_iter()
            .filter(|t| self.is_reconstructed(t.as_str()))
            .collect();
        times.sort();
        times
    }

    /// Ascending list of every numbered top-level directory, regardless of
    /// whether its reconstruction marker is present. Used during setup's
    /// cleanup pass to find reconstructed directories left incomplete by a
    /// crash (`is_reconstructed` is false for these, unlike anything
    /// `reconstructed_times` would yield).
    pub fn reconstructed_dir_candidates(&self) -> Vec<Timestep> {
        let mut times = numbered_subdirs(&self.case_dir);
        times.sort();
        times
    }

    /// Ascending list of T for which `T.tar` exists at top level.
    pub fn tarred_times(&self) -> Vec<Timestep> {
        let mut times = Vec::new();
        let Ok(entries) = fs::read_dir(&self.case_dir) else {
            return times;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".tar") {
                if stem.starts_with(|c: char| c.is_ascii_digit()) {
                    if let Ok(t) = Timestep::parse(stem) {
                        times.push(t);
                    }
                }
            }
        }
        times.sort();
        times
    }

    /// All `times_<start>_<end>_<step>.tgz` filenames present at top level.
    pub fn compressed_files(&self) -> Vec<String> {
        let mut names = Vec::new();
        let Ok(entries) = fs::read_dir(&self.case_dir) else {
            return names;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.is_compressed_file(&name) {
                names.push(name);
            }
        }
        names.sort();
        names
    }

    pub fn is_reconstructed(&self, t: &str) -> bool {
        self.case_dir.join(t).join(RECONSTRUCTION_DONE_MARKER_FILENAME).is_file()
    }

    pub fn is_tarred(&self, t: &str) -> bool {
        self.case_dir.join(format!("{t}.tar")).is_file()
    }

    /// True iff some existing compressed-group file's inclusion rule
    /// covers `t` (spec.md §3).
    pub fn is_compressed(&self, t: &str) -> bool {
        let Ok(value) = Timestep::parse(t) else {
            return false;
        };
        for name in self.compressed_files() {
            let Ok((start, end, step)) = parse_compressed_filename(&name) else {
                continue;
            };
            if value < start || value > end {
                continue;
            }
            if step.value().is_zero() {
                continue;
            }
            if value.value() % step.value() == Decimal::ZERO {
                return true;
            }
        }
        false
    }

    pub fn is_compressed_file(&self, filename: &str) -> bool {
        if !filename.ends_with(".tgz") || !filename.starts_with("times_") {
            return false;
        }
        if parse_compressed_filename(filename).is_err() {
            return false;
        }
        self.case_dir.join(filename).is_file()
    }

    /// Checks that the top-level reconstructed directory exists; makes no
    /// guarantee that it is fully written.
    pub fn reconstructed_dir_exists(&self, t: &str) -> bool {
        self.case_dir.join(t).is_dir()
    }

    /// Checks that T exists in at least one `processor*/` sibling; makes no
    /// guarantee that it is fully written.
    pub fn split_exists(&self, t: &str) -> bool {
        let Ok(entries) = fs::read_dir(&self.case_dir) else {
            return false;
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with("processor") && entry.path().is_dir() && entry.path().join(t).is_dir()
            {
                return true;
            }
        }
        false
    }

    pub fn create_compressed_filename(start: &str, end: &str, step: &str) -> Result<String, EngineError> {
        Ok(timestep::create_compressed_filename(start, end, step)?)
    }

    pub fn parse_compressed_filename(name: &str) -> Result<(Timestep, Timestep, Timestep), EngineError> {
        Ok(parse_compressed_filename(name)?)
    }
}

fn numbered_subdirs(dir: &Path) -> Vec<Timestep> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            if name.starts_with(|c: char| c.is_ascii_digit()) {
                Timestep::parse(&name).ok()
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "file_state_tests.rs"]
mod tests;
