//! Error taxonomy for the harness.
//!
//! Discovery, case addressing and report output errors abort a run.
//! Everything else degrades to a failed case and the driver moves on.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type HarnessResult<T> = Result<T, HarnessError>;

#[derive(Error, Diagnostic, Debug)]
pub enum HarnessError {
    #[error("cannot read case directory '{}'", path.display())]
    #[diagnostic(
        code(harness::discovery),
        help("pass the directory holding one subdirectory per module with --cases")
    )]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to launch '{}'", binary.display())]
    #[diagnostic(
        code(harness::spawn),
        help("check that the binary under test exists and is executable")
    )]
    Spawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("lost contact with the process under test")]
    #[diagnostic(code(harness::capture))]
    Capture {
        #[source]
        source: io::Error,
    },

    #[error("cannot read expected output '{}'", path.display())]
    #[diagnostic(code(harness::expected_file))]
    ExpectedFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write the report")]
    #[diagnostic(code(harness::output))]
    Output {
        #[from]
        source: io::Error,
    },

    #[error("there is no test case {index}; the suite has {total} case(s)")]
    #[diagnostic(
        code(harness::case_index),
        help("case numbers start at 0 and follow the order of the full run")
    )]
    CaseIndex { index: usize, total: usize },
}

impl HarnessError {
    /// Whether this error stops the whole run rather than a single case.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HarnessError::Discovery { .. }
                | HarnessError::CaseIndex { .. }
                | HarnessError::Output { .. }
        )
    }
}
