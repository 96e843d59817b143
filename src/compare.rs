//! Comparison of captured output against golden files.

use std::fmt;

/// Sentinel a parser under test prints on stderr when it rejects its input.
pub const SYNTAX_ERROR: &[u8] = b"syntax error";

/// Strategy used to turn an execution into a verdict. Chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonMode {
    /// Stdout and stderr must both match their golden files.
    #[default]
    Exact,
    /// Only checks whether `syntax error` was reported on stderr when expected.
    SyntaxOnly,
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonMode::Exact => write!(f, "exact"),
            ComparisonMode::SyntaxOnly => write!(f, "syntax-only"),
        }
    }
}

/// Captured and expected output of one case.
#[derive(Debug, Clone, Copy)]
pub struct OutputPair<'a> {
    pub actual_stdout: &'a [u8],
    pub actual_stderr: &'a [u8],
    pub expected_stdout: &'a [u8],
    pub expected_stderr: &'a [u8],
}

impl ComparisonMode {
    pub fn passes(self, output: &OutputPair<'_>) -> bool {
        match self {
            ComparisonMode::Exact => {
                compare(output.actual_stdout, output.expected_stdout)
                    && compare(output.actual_stderr, output.expected_stderr)
            }
            ComparisonMode::SyntaxOnly => {
                syntax_only(output.actual_stderr, output.expected_stderr)
            }
        }
    }
}

/// Removes every trailing `\n`. Nothing else is normalized.
pub fn strip_trailing_newlines(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != b'\n')
        .map_or(0, |pos| pos + 1);
    &bytes[..end]
}

pub fn compare(actual: &[u8], expected: &[u8]) -> bool {
    strip_trailing_newlines(actual) == strip_trailing_newlines(expected)
}

fn syntax_only(actual_stderr: &[u8], expected_stderr: &[u8]) -> bool {
    let reported = strip_trailing_newlines(actual_stderr) == SYNTAX_ERROR;
    if strip_trailing_newlines(expected_stderr) == SYNTAX_ERROR {
        reported
    } else {
        !reported
    }
}
