// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tempfile::TempDir;
use tstep_adapters::AdapterError;

#[derive(Default)]
struct FakeBackend {
    requeue_calls: usize,
    compress_calls: Vec<(String, Vec<String>)>,
}

impl JobBackend for FakeBackend {
    fn requeue_job(&mut self) -> Result<(), AdapterError> {
        self.requeue_calls += 1;
        Ok(())
    }

    fn compress(&mut self, archive_name: &str, files: &[String]) -> Result<(), AdapterError> {
        self.compress_calls.push((archive_name.to_string(), files.to_vec()));
        Ok(())
    }
}

fn make_case_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("constant")).unwrap();
    fs::create_dir_all(dir.path().join("system")).unwrap();
    fs::create_dir_all(dir.path().join("processor0")).unwrap();
    dir
}

fn with_split_times(dir: &Path, times: &[&str]) {
    for t in times {
        fs::create_dir_all(dir.join("processor0").join(t)).unwrap();
    }
}

fn with_reconstructed(dir: &Path, times: &[&str]) {
    for t in times {
        let t_dir = dir.join(t);
        fs::create_dir_all(&t_dir).unwrap();
        fs::write(t_dir.join(crate::file_state::RECONSTRUCTION_DONE_MARKER_FILENAME), b"").unwrap();
    }
}

fn with_tarred(dir: &Path, times: &[&str]) {
    for t in times {
        fs::write(dir.join(format!("{t}.tar")), b"").unwrap();
    }
}

fn with_compressed(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"").unwrap();
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn delete_splits(tasks: &[PlannedTask]) -> Vec<String> {
    tasks
        .iter()
        .filter_map(|t| match t {
            PlannedTask::DeleteSplit(ts) => Some(ts.as_str().to_string()),
            _ => None,
        })
        .collect()
}

fn reconstructs(tasks: &[PlannedTask]) -> Vec<String> {
    tasks
        .iter()
        .filter_map(|t| match t {
            PlannedTask::Reconstruct(ts) => Some(ts.as_str().to_string()),
            _ => None,
        })
        .collect()
}

#[test]
fn rejects_compress_every_not_a_strict_multiple_of_keep_every() {
    let backend = FakeBackend::default();
    let result = Listener::new(decimal("0.1"), decimal("0.1"), backend, false);
    assert!(matches!(result, Err(EngineError::InvalidConfiguration(_))));
}

#[test]
fn scenario_a_mixed_keep_and_discard() {
    let dir = make_case_dir();
    with_split_times(dir.path(), &["0.01", "0.03", "0.05", "0.1", "0.3", "0.5", "1", "3", "5", "10"]);
    let state = FileState::new(dir.path()).unwrap();
    let backend = FakeBackend::default();
    let mut listener = Listener::new(decimal("0.1"), decimal("0.2"), backend, false).unwrap();

    let tasks = listener.plan(&state).unwrap();
    let mut deleted = delete_splits(&tasks);
    deleted.sort();
    let mut reconstructed = reconstructs(&tasks);
    reconstructed.sort();

    assert_eq!(deleted, vec!["0.01", "0.03", "0.05"]);
    assert_eq!(reconstructed, vec!["0.1", "0.3", "0.5", "1", "3", "5"]);
    assert!(tasks.iter().all(|t| t.timestep().as_str() != "10"));
}

#[test]
fn scenario_b_larger_keep_every() {
    let dir = make_case_dir();
    with_split_times(dir.path(), &["0.1", "0.3", "0.5", "1", "3", "5", "10"]);
    let state = FileState::new(dir.path()).unwrap();
    let backend = FakeBackend::default();
    let mut listener = Listener::new(decimal("0.3"), decimal("0.6"), backend, false).unwrap();

    let tasks = listener.plan(&state).unwrap();
    let mut deleted = delete_splits(&tasks);
    deleted.sort();
    let mut reconstructed = reconstructs(&tasks);
    reconstructed.sort();

    assert_eq!(deleted, vec!["0.1", "0.5", "1", "5"]);
    assert_eq!(reconstructed, vec!["0.3", "3"]);
    assert!(tasks.iter().all(|t| t.timestep().as_str() != "10"));
}

#[test]
fn scenario_c_tar_and_delete_split_without_premature_delete_reconstructed() {
    let dir = make_case_dir();
    with_split_times(dir.path(), &["0.1", "0.2"]);
    with_reconstructed(dir.path(), &["0.1"]);
    let state = FileState::new(dir.path()).unwrap();
    let backend = FakeBackend::default();
    let mut listener = Listener::new(decimal("0.1"), decimal("0.2"), backend, false).unwrap();

    let tasks = listener.plan(&state).unwrap();
    assert!(tasks.contains(&PlannedTask::Tar(Timestep::parse("0.1").unwrap())));
    assert!(tasks.contains(&PlannedTask::DeleteSplit(Timestep::parse("0.1").unwrap())));
    assert_eq!(delete_splits(&tasks), vec!["0.1"], "DeleteSplit(0.1) must be emitted exactly once");
    assert!(!tasks.iter().any(|t| matches!(t, PlannedTask::DeleteReconstructed(_))));
}

#[test]
fn scenario_d_complete_group_requests_compress_without_delete_tar() {
    let dir = make_case_dir();
    with_tarred(dir.path(), &["0", "0.05", "0.1", "0.15"]);
    let state = FileState::new(dir.path()).unwrap();
    let backend = FakeBackend::default();
    let mut listener = Listener::new(decimal("0.05"), decimal("0.2"), backend, false).unwrap();

    let tasks = listener.plan(&state).unwrap();
    assert_eq!(listener.backend.compress_calls.len(), 1);
    let (name, files) = &listener.backend.compress_calls[0];
    assert_eq!(name, "times_0_0.15_0.05.tgz");
    assert_eq!(files, &vec!["0.tar", "0.05.tar", "0.1.tar", "0.15.tar"]);

    for t in ["0", "0.05", "0.1", "0.15"] {
        assert!(tasks.contains(&PlannedTask::DeleteReconstructed(Timestep::parse(t).unwrap())));
    }
    assert!(!tasks.iter().any(|t| matches!(t, PlannedTask::DeleteTar(_))));
}

#[test]
fn scenario_e_existing_compressed_file_triggers_delete_tar_not_recompress() {
    let dir = make_case_dir();
    with_tarred(dir.path(), &["0", "0.05", "0.1", "0.15"]);
    with_compressed(dir.path(), "times_0_0.15_0.05.tgz");
    let state = FileState::new(dir.path()).unwrap();
    let backend = FakeBackend::default();
    let mut listener = Listener::new(decimal("0.05"), decimal("0.2"), backend, false).unwrap();

    let tasks = listener.plan(&state).unwrap();
    assert_eq!(listener.backend.compress_calls.len(), 0, "already-sealed group must not be recompressed");
    for t in ["0", "0.05", "0.1", "0.15"] {
        assert!(tasks.contains(&PlannedTask::DeleteTar(Timestep::parse(t).unwrap())));
    }
}

#[test]
fn scenario_f_gap_leaves_only_the_complete_group_requested() {
    let dir = make_case_dir();
    with_tarred(dir.path(), &["0", "0.05", "0.1", "0.2", "0.25", "0.3", "0.35", "0.4"]);
    let state = FileState::new(dir.path()).unwrap();
    let backend = FakeBackend::default();
    let mut listener = Listener::new(decimal("0.05"), decimal("0.2"), backend, false).unwrap();

    listener.plan(&state).unwrap();
    assert_eq!(listener.backend.compress_calls.len(), 1);
    let (name, files) = &listener.backend.compress_calls[0];
    assert_eq!(name, "times_0.2_0.35_0.05.tgz");
    assert_eq!(files, &vec!["0.2.tar", "0.25.tar", "0.3.tar", "0.35.tar"]);
}

#[test]
fn requeue_is_invoked_exactly_once_across_multiple_reconstruct_emissions() {
    let dir = make_case_dir();
    with_split_times(dir.path(), &["0.1", "0.2", "0.3"]);
    let state = FileState::new(dir.path()).unwrap();
    let backend = FakeBackend::default();
    let mut listener = Listener::new(decimal("0.1"), decimal("0.2"), backend, true).unwrap();

    listener.plan(&state).unwrap();
    assert_eq!(listener.backend.requeue_calls, 1);
}

#[test]
fn requeue_is_a_no_op_when_disabled() {
    let dir = make_case_dir();
    with_split_times(dir.path(), &["0.1", "0.2"]);
    let state = FileState::new(dir.path()).unwrap();
    let backend = FakeBackend::default();
    let mut listener = Listener::new(decimal("0.1"), decimal("0.2"), backend, false).unwrap();

    listener.plan(&state).unwrap();
    assert_eq!(listener.backend.requeue_calls, 0);
}

#[test]
fn zero_timestep_is_always_deleted_never_reconstructed() {
    let dir = make_case_dir();
    with_split_times(dir.path(), &["0", "1"]);
    let state = FileState::new(dir.path()).unwrap();
    let backend = FakeBackend::default();
    let mut listener = Listener::new(decimal("0.1"), decimal("0.2"), backend, false).unwrap();

    let tasks = listener.plan(&state).unwrap();
    assert!(tasks.contains(&PlannedTask::DeleteSplit(Timestep::parse("0").unwrap())));
    assert!(!tasks.iter().any(|t| matches!(t, PlannedTask::Reconstruct(ts) if ts.as_str() == "0")));
}

#[test]
fn last_split_time_is_never_touched() {
    let dir = make_case_dir();
    with_split_times(dir.path(), &["0.1", "0.2"]);
    let state = FileState::new(dir.path()).unwrap();
    let backend = FakeBackend::default();
    let mut listener = Listener::new(decimal("0.1"), decimal("0.2"), backend, false).unwrap();

    let tasks = listener.plan(&state).unwrap();
    assert!(tasks.iter().all(|t| t.timestep().as_str() != "0.2"));
}

#[test]
fn delete_split_is_never_emitted_twice_for_the_same_timestep_within_one_listener() {
    let dir = make_case_dir();
    with_split_times(dir.path(), &["0.01", "0.1"]);
    let state = FileState::new(dir.path()).unwrap();
    let backend = FakeBackend::default();
    let mut listener = Listener::new(decimal("0.1"), decimal("0.2"), backend, false).unwrap();

    let first = listener.plan(&state).unwrap();
    let second = listener.plan(&state).unwrap();
    assert_eq!(delete_splits(&first), vec!["0.01"]);
    assert!(delete_splits(&second).is_empty(), "already-scheduled deletes must not repeat within the same run");
}
