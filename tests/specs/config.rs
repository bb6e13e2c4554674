// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tstep config sample` output.

use crate::support::prelude::*;

#[test]
fn sample_writes_a_loadable_config_file() {
    let project = Project::empty();

    project.tstep().args(["config", "sample", "tstep.toml"]).passes();

    assert!(project.exists("tstep.toml"));
    let contents = std::fs::read_to_string(project.path().join("tstep.toml")).unwrap();
    assert!(contents.contains("keep_every"));
    assert!(contents.contains("[slurm]"));

    // round-trips back through setup --dry-run's config loading path
    // without error (malformed TOML would surface as InvalidConfiguration).
    project
        .tstep()
        .args(["setup", "--dry-run", "--config", "tstep.toml"])
        .fails() // processor0/constant/system aren't present in this empty project
        .code(2);
}

#[test]
fn sample_fails_loudly_if_the_directory_does_not_exist() {
    let project = Project::empty();

    project.tstep().args(["config", "sample", "missing-dir/tstep.toml"]).fails();
}
