// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tstep monitor` — plan-and-drain loop.

use crate::support::prelude::*;

#[test]
fn once_deletes_a_split_time_that_is_not_a_keep_every_multiple() {
    let project = Project::bare_case();
    // "0.1" is the last split time, presumed still being written, and is
    // left alone; "0.01" isn't a `keep_every` multiple and is torn down.
    project.dir("processor0/0.01");
    project.dir("processor0/0.1");

    project
        .tstep()
        .args([
            "monitor",
            "--once",
            "--keep-every",
            "0.1",
            "--compress-every",
            "0.2",
            "--sleep-time-per-update",
            "0",
        ])
        .passes();

    for _ in 0..200 {
        if !project.exists("processor0/0.01") {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    assert!(!project.exists("processor0/0.01"));
    assert!(project.exists("processor0/0.1"), "the last split time is never touched");
}

#[test]
fn fails_on_an_invalid_case_directory() {
    let project = Project::empty();

    project
        .tstep()
        .args(["monitor", "--once", "--keep-every", "0.1", "--compress-every", "0.2"])
        .fails()
        .code(2);
}
