// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tstep setup` — cleanup/seed protocol.

use crate::support::prelude::*;

fn base_args() -> Vec<&'static str> {
    vec!["setup", "--keep-every", "0.1", "--compress-every", "0.2"]
}

#[test]
fn fails_on_a_directory_missing_processor0() {
    let project = Project::empty();
    project.dir("constant").dir("system");

    project.tstep().args(base_args()).fails().code(2);
}

#[test]
fn rejects_compress_every_not_a_multiple_of_keep_every() {
    let project = Project::bare_case();

    project
        .tstep()
        .args(["setup", "--keep-every", "0.1", "--compress-every", "0.25"])
        .fails()
        .code(3);
}

#[test]
fn rejects_missing_keep_every_with_no_config() {
    let project = Project::bare_case();

    project.tstep().args(["setup"]).fails().code(3);
}

#[test]
fn dry_run_reports_the_plan_without_touching_the_filesystem() {
    let project = Project::bare_case();
    project.dir("processor0/0.1");

    let mut args = base_args();
    args.push("--dry-run");
    project.tstep().args(args).passes().stdout_has("0.1");

    assert!(project.exists("processor0/0.1"), "dry-run must not mutate state");
}

#[test]
fn succeeds_and_clears_processor_dirs_when_a_reconstructed_time_already_survives() {
    let project = Project::bare_case();
    project.file("0.1/.__reconstruction_done", "");

    project.tstep().args(base_args()).passes().stdout_has("ready");

    assert!(!project.exists("processor0"));
    assert!(project.exists("0.1/.__reconstruction_done"));
}

#[test]
fn fails_unrecoverable_when_nothing_survives_and_reconstruction_cannot_run() {
    let project = Project::bare_case();
    project.dir("processor0/0.1");

    project.tstep().args(base_args()).fails().code(6);
}
