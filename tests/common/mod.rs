//! Shared fixtures: a temporary case tree and a stand-in binary under test.
//!
//! The stand-in is a shell script that runs its input file as a shell script,
//! so every case input below is a small `sh` program.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use golden_harness::HarnessConfig;
use tempfile::TempDir;

/// Short enough to keep the suite fast, long enough for `sh` to start.
pub const TEST_TIMEOUT: Duration = Duration::from_millis(500);

/// Busy loop built from shell builtins only.
pub const HANG: &str = "while :; do :; done\n";

pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("cases")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn cases_root(&self) -> PathBuf {
        self.root().join("cases")
    }

    /// Writes a case input plus whichever golden files are given.
    pub fn case(&self, module: &str, name: &str, input: &str, stdout: Option<&str>, stderr: Option<&str>) -> PathBuf {
        let dir = self.cases_root().join(module);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, input).unwrap();
        if let Some(stdout) = stdout {
            fs::write(dir.join(format!("{name}.outp")), stdout).unwrap();
        }
        if let Some(stderr) = stderr {
            fs::write(dir.join(format!("{name}.error")), stderr).unwrap();
        }
        path
    }

    /// An executable script at `name` with the given body.
    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.root().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    /// The stand-in binary: executes the case file with `sh`.
    pub fn interpreter(&self) -> PathBuf {
        self.script("interp", "exec /bin/sh \"$1\"\n")
    }

    pub fn config(&self) -> HarnessConfig {
        HarnessConfig {
            binary: self.interpreter(),
            cases_root: self.cases_root(),
            timeout: TEST_TIMEOUT,
            ..HarnessConfig::default()
        }
    }
}
