// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level `tstep` help/version output.

use crate::support::prelude::*;

#[test]
fn no_args_shows_usage_and_exits_nonzero() {
    cli().fails().stderr_has("Usage:");
}

#[test]
fn help_shows_subcommands() {
    cli().args(["--help"]).passes().stdout_has("setup").stdout_has("monitor").stdout_has("config");
}

#[test]
fn setup_help_shows_case_directory_flag() {
    cli().args(["setup", "--help"]).passes().stdout_has("--case-directory");
}

#[test]
fn version_shows_a_build_hash_suffix() {
    cli().args(["--version"]).passes().stdout_has("+");
}
