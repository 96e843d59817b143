//! Golden case store: finds modules and their cases under a root directory.
//!
//! ```text
//! cases/
//!   arith/
//!     add.in          input passed to the binary under test
//!     add.in.outp     expected stdout (optional)
//!     add.in.error    expected stderr (optional)
//! ```
//!
//! Modules and cases are sorted by name, so a case's global index is the same
//! on every invocation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::info;
use walkdir::WalkDir;

use crate::errors::{HarnessError, HarnessResult};

pub const STDOUT_SUFFIX: &str = ".outp";
pub const STDERR_SUFFIX: &str = ".error";

/// A single golden-file case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub module: String,
    pub input: PathBuf,
    pub expected_stdout: Option<PathBuf>,
    pub expected_stderr: Option<PathBuf>,
}

impl TestCase {
    /// Builds a case from its input path, picking up whichever companion files exist.
    pub fn from_input(module: impl Into<String>, input: PathBuf) -> Self {
        let expected_stdout = companion(&input, STDOUT_SUFFIX);
        let expected_stderr = companion(&input, STDERR_SUFFIX);
        Self {
            module: module.into(),
            input,
            expected_stdout,
            expected_stderr,
        }
    }

    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Human readable name, e.g. `nested-loops.in` becomes `Nested Loops.in`.
    pub fn title(&self) -> String {
        title_case(&self.file_name())
    }

    /// Expected stdout; a missing companion file means empty.
    pub fn read_expected_stdout(&self) -> HarnessResult<Vec<u8>> {
        read_expected(self.expected_stdout.as_deref())
    }

    /// Expected stderr; a missing companion file means empty.
    pub fn read_expected_stderr(&self) -> HarnessResult<Vec<u8>> {
        read_expected(self.expected_stderr.as_deref())
    }

    /// Short content fingerprint of the input, stable across renames.
    pub fn fingerprint(&self) -> String {
        match fs::read(&self.input) {
            Ok(content) => fingerprint(&content),
            Err(_) => "????".to_string(),
        }
    }
}

/// A named group of cases backed by one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub cases: Vec<TestCase>,
}

impl Module {
    pub fn title(&self) -> String {
        title_case(&self.name)
    }
}

/// Every module under a root, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct Suite {
    pub root: PathBuf,
    pub modules: Vec<Module>,
}

impl Suite {
    pub fn len(&self) -> usize {
        self.modules.iter().map(|m| m.cases.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Yields `(global index, module, case)` in discovery order.
    pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, &Module, &TestCase)> {
        self.modules
            .iter()
            .flat_map(|module| module.cases.iter().map(move |case| (module, case)))
            .enumerate()
            .map(|(index, (module, case))| (index, module, case))
    }

    /// Looks up a case by its global index.
    pub fn case(&self, index: usize) -> HarnessResult<&TestCase> {
        self.iter_indexed()
            .nth(index)
            .map(|(_, _, case)| case)
            .ok_or(HarnessError::CaseIndex {
                index,
                total: self.len(),
            })
    }
}

/// Lists modules and cases under `root`.
pub fn discover<P: AsRef<Path>>(root: P) -> HarnessResult<Suite> {
    let root = root.as_ref();
    let discovery_error = |source: io::Error| HarnessError::Discovery {
        path: root.to_path_buf(),
        source,
    };

    let meta = fs::metadata(root).map_err(discovery_error)?;
    if !meta.is_dir() {
        return Err(discovery_error(io::Error::new(
            io::ErrorKind::NotFound,
            "not a directory",
        )));
    }

    let mut modules = Vec::new();
    for dir in sorted_entries(root).map_err(discovery_error)? {
        if !dir.is_dir() {
            continue;
        }
        let name = entry_name(&dir);
        let cases = sorted_entries(&dir)
            .map_err(discovery_error)?
            .into_iter()
            .filter(|path| path.is_file() && !is_companion(path))
            .map(|path| TestCase::from_input(name.clone(), path))
            .collect();
        modules.push(Module { name, cases });
    }

    let suite = Suite {
        root: root.to_path_buf(),
        modules,
    };
    info!(
        root = %root.display(),
        modules = suite.modules.len(),
        cases = suite.len(),
        "discovered test suite"
    );
    Ok(suite)
}

fn sorted_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        entries.push(entry.into_path());
    }
    Ok(entries)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_companion(path: &Path) -> bool {
    let name = entry_name(path);
    name.ends_with(STDOUT_SUFFIX) || name.ends_with(STDERR_SUFFIX)
}

fn companion(input: &Path, suffix: &str) -> Option<PathBuf> {
    let mut path = input.as_os_str().to_os_string();
    path.push(suffix);
    let path = PathBuf::from(path);
    path.is_file().then_some(path)
}

fn read_expected(path: Option<&Path>) -> HarnessResult<Vec<u8>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    fs::read(path).map_err(|source| HarnessError::ExpectedFile {
        path: path.to_path_buf(),
        source,
    })
}

pub fn fingerprint(content: &[u8]) -> String {
    Sha256::digest(content)
        .iter()
        .take(2)
        .map(|b| format!("{:02x}", b))
        .collect()
}

pub fn title_case(name: &str) -> String {
    name.replace(['-', '_'], " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
