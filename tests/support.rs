// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the `tstep` CLI integration specs.

use std::path::Path;
use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

/// A throwaway directory the tests treat as an OpenFOAM case / cwd.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Project { dir: TempDir::new().expect("create tempdir") }
    }

    /// A case directory valid enough to pass `FileState::new`'s layout
    /// check: `constant/`, `system/`, `processor0/` all present.
    pub fn bare_case() -> Self {
        let project = Self::empty();
        project.dir("constant").dir("system").dir("processor0");
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn dir(&self, relative: &str) -> &Self {
        std::fs::create_dir_all(self.dir.path().join(relative)).expect("create fixture dir");
        self
    }

    pub fn file(&self, relative: &str, contents: &str) -> &Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create fixture parent dir");
        }
        std::fs::write(path, contents).expect("write fixture file");
        self
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.dir.path().join(relative).exists()
    }

    pub fn tstep(&self) -> Command {
        let mut cmd = Command::cargo_bin("tstep").expect("tstep binary");
        cmd.current_dir(self.dir.path());
        cmd
    }
}

/// A `tstep` invocation with no project directory, for subcommand-less
/// queries like `--help`/`--version`.
pub fn cli() -> Command {
    Command::cargo_bin("tstep").expect("tstep binary")
}

pub struct Outcome {
    output: Output,
}

pub trait CommandExt {
    fn passes(self) -> Outcome;
    fn fails(self) -> Outcome;
}

impl CommandExt for Command {
    fn passes(mut self) -> Outcome {
        let output = self.output().expect("run tstep");
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        Outcome { output }
    }

    fn fails(mut self) -> Outcome {
        let output = self.output().expect("run tstep");
        assert!(
            !output.status.success(),
            "expected failure, command succeeded\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout),
        );
        Outcome { output }
    }
}

impl Outcome {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(&self, needle: &str) -> &Self {
        assert!(self.stdout().contains(needle), "stdout missing {needle:?}:\n{}", self.stdout());
        self
    }

    pub fn stderr_has(&self, needle: &str) -> &Self {
        assert!(self.stderr().contains(needle), "stderr missing {needle:?}:\n{}", self.stderr());
        self
    }

    pub fn code(&self, expected: i32) -> &Self {
        assert_eq!(self.output.status.code(), Some(expected));
        self
    }
}

pub mod prelude {
    pub use super::{cli, CommandExt, Project};
}
