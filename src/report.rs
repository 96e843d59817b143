//! Console reporting: live progress, module summaries, the final scoreboard and
//! the detailed view of a single case.
//!
//! Everything is written through [`WriteColor`], so the same code drives a
//! colored terminal and an uncolored in-memory buffer.

use std::error::Error as _;
use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};
use unicode_width::UnicodeWidthStr;

use crate::compare::strip_trailing_newlines;
use crate::discovery::{Module, TestCase};
use crate::harness::CaseRun;
use crate::runner::Outcome;
use crate::stats::{ModuleTally, RunStatistics};

/// Width that section headers are padded to.
const HEADER_WIDTH: usize = 75;

/// Width of the rules framing a failure in verbose mode.
const RULE_WIDTH: usize = 40;

const PASS_MARKER: &str = ".";
const FAIL_MARKER: &str = "x";

pub struct Reporter<W: WriteColor> {
    out: W,
    verbose: bool,
}

impl<W: WriteColor> Reporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    // ------------------------------------------------------------------------
    // Summary mode
    // ------------------------------------------------------------------------

    pub fn module_started(&mut self, module: &Module) -> io::Result<()> {
        self.paint(module.title(), accent())?;
        writeln!(self.out)?;
        if !self.verbose {
            self.paint("|", accent())?;
            write!(self.out, "\t")?;
        }
        self.out.flush()
    }

    /// Prints the progress marker (or verbose line) for a finished case.
    pub fn case_finished(&mut self, case: &TestCase, run: &CaseRun) -> io::Result<()> {
        let color = if run.passed() { pass() } else { fail() };
        if self.verbose {
            self.paint("|", accent())?;
            write!(self.out, " {:>4}  ", run.index())?;
            self.paint(case.fingerprint(), color)?;
            writeln!(
                self.out,
                "  {:<32} {:>8.1} ms",
                case.title(),
                millis(run.elapsed())
            )?;
        } else {
            let marker = if run.passed() { PASS_MARKER } else { FAIL_MARKER };
            self.paint(marker, color)?;
        }
        self.out.flush()
    }

    /// Verbose mode only: expected output, actual output and the case input of
    /// a failed case, right below its line.
    pub fn failure_details(&mut self, run: &CaseRun, source: &[u8]) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        let (actual_stdout, actual_stderr) = actual(run);
        self.rule("Expected")?;
        self.streams(&run.expected_stdout, &run.expected_stderr)?;
        self.rule("Output")?;
        self.streams(actual_stdout, actual_stderr)?;
        self.process_summary(run)?;
        self.rule("Test Case")?;
        self.streams(source, &[])?;
        self.rule("")?;
        writeln!(self.out)?;
        self.out.flush()
    }

    /// Notice printed when the first failure ends the run early.
    pub fn stopped_early(&mut self) -> io::Result<()> {
        self.paint("Test failure caught. Stopping the run and reporting.", fail())?;
        writeln!(self.out)?;
        self.out.flush()
    }

    pub fn module_finished(&mut self, tally: &ModuleTally) -> io::Result<()> {
        if !self.verbose {
            writeln!(self.out)?;
        }
        self.paint("|", accent())?;
        if tally.all_passed() {
            self.paint(format!("\tPassed all {} cases", tally.total), pass())?;
            writeln!(self.out)?;
        } else {
            self.paint(
                format!("\tPassed {} of {} tests", tally.passed, tally.total),
                fail(),
            )?;
            writeln!(self.out)?;
            self.paint("|", accent())?;
            self.paint("\tFailed test cases", fail())?;
            for index in &tally.failed {
                write!(self.out, " ")?;
                self.paint(index.to_string(), fail().set_bold(true).clone())?;
            }
            writeln!(self.out)?;
        }
        self.out.flush()
    }

    pub fn scoreboard(&mut self, stats: &RunStatistics, binary: &str) -> io::Result<()> {
        writeln!(self.out)?;
        let lines = [
            format!("Passed:\t{}", stats.passed()),
            format!("Failed:\t{}", stats.failed_count()),
            format!("Total:\t{}", stats.total()),
            format!(
                "Passed {:.1}% with an average time of {:.1} ms per test",
                stats.percentage(),
                millis(stats.average())
            ),
        ];
        for line in lines {
            self.paint(line, info())?;
            writeln!(self.out)?;
        }
        if stats.all_passed() {
            self.paint("You pass everything I can throw at it.", pass())?;
        } else {
            self.paint(
                format!(
                    "Run 'harness {} <test-no>' to see detailed output about a specific test you failed",
                    binary
                ),
                info(),
            )?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    // ------------------------------------------------------------------------
    // Detailed mode
    // ------------------------------------------------------------------------

    /// Full report for one case: source, side-by-side outputs, verdict.
    pub fn detailed(&mut self, case: &TestCase, source: &[u8], run: &CaseRun) -> io::Result<()> {
        self.header(&format!("{} [{}]", case.title(), case.fingerprint()))?;
        self.numbered_source(source)?;

        let (actual_stdout, actual_stderr) = actual(run);
        let (actual_stdout, actual_stderr) = (text(actual_stdout), text(actual_stderr));
        let expected_stdout = text(&run.expected_stdout);
        let expected_stderr = text(&run.expected_stderr);
        let width = widest_line(&[expected_stdout.as_str(), expected_stderr.as_str()]);

        self.header("Stdout === [Expected | Actual]")?;
        self.side_by_side(&expected_stdout, &actual_stdout, width)?;
        self.header("Stderr === [Expected | Actual]")?;
        self.side_by_side(&expected_stderr, &actual_stderr, width)?;

        writeln!(self.out)?;
        self.process_summary(run)?;
        if run.passed() {
            self.paint("\u{2713} Test Passed", pass())?;
        } else {
            self.paint("\u{2717} Test Failed", fail())?;
        }
        writeln!(self.out)?;
        self.out.flush()
    }

    fn header(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out)?;
        let fill = "=".repeat(HEADER_WIDTH.saturating_sub(title.width()));
        self.paint(
            format!("=== {} {}", title, fill),
            accent().set_underline(true).clone(),
        )?;
        writeln!(self.out)
    }

    fn numbered_source(&mut self, source: &[u8]) -> io::Result<()> {
        for (number, line) in text(source).lines().enumerate() {
            self.paint(format!("{:0>2}| ", number + 1), accent())?;
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    fn side_by_side(&mut self, expected: &str, actual: &str, width: usize) -> io::Result<()> {
        let left: Vec<&str> = expected.split('\n').collect();
        let right: Vec<&str> = actual.split('\n').collect();
        for row in 0..left.len().max(right.len()) {
            match left.get(row) {
                Some(line) => {
                    write!(self.out, "{}{}", line, pad(line, width))?;
                    self.paint("  |", accent())?;
                }
                None => {
                    write!(self.out, "{}", " ".repeat(width))?;
                    self.paint("--|", accent())?;
                }
            }
            match right.get(row) {
                Some(line) => writeln!(self.out, "  {}", line)?,
                None => {
                    self.paint("--", accent())?;
                    writeln!(self.out)?;
                }
            }
        }
        Ok(())
    }

    fn rule(&mut self, title: &str) -> io::Result<()> {
        let mut line = if title.is_empty() {
            String::new()
        } else {
            format!("==== {} ", title)
        };
        line.push_str(&"=".repeat(RULE_WIDTH.saturating_sub(line.width())));
        self.paint(line, fail())?;
        writeln!(self.out)
    }

    /// Each non-empty stream as text, one after the other.
    fn streams(&mut self, stdout: &[u8], stderr: &[u8]) -> io::Result<()> {
        for stream in [stdout, stderr] {
            let shown = text(stream);
            if !shown.is_empty() {
                writeln!(self.out, "{}", shown)?;
            }
        }
        Ok(())
    }

    fn process_summary(&mut self, run: &CaseRun) -> io::Result<()> {
        if let Some(err) = &run.error {
            let mut message = err.to_string();
            if let Some(source) = err.source() {
                message = format!("{}: {}", message, source);
            }
            self.paint(message, fail())?;
            writeln!(self.out)?;
        }
        if let Some(result) = &run.execution {
            let line = match result.outcome {
                Outcome::Exited(Some(code)) => format!(
                    "Exited with status {} after {:.1} ms",
                    code,
                    millis(result.elapsed)
                ),
                Outcome::Exited(None) => format!(
                    "Terminated by a signal after {:.1} ms",
                    millis(result.elapsed)
                ),
                Outcome::TimedOut => format!(
                    "Killed by the watchdog after {:.1} ms",
                    millis(result.elapsed)
                ),
            };
            self.paint(line, info())?;
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn paint(&mut self, text: impl AsRef<str>, spec: ColorSpec) -> io::Result<()> {
        self.out.set_color(&spec)?;
        write!(self.out, "{}", text.as_ref())?;
        self.out.reset()
    }
}

fn pass() -> ColorSpec {
    fg(Color::Green)
}

fn fail() -> ColorSpec {
    fg(Color::Red)
}

fn accent() -> ColorSpec {
    fg(Color::Magenta)
}

fn info() -> ColorSpec {
    fg(Color::Blue)
}

fn fg(color: Color) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_intense(true);
    spec
}

fn actual(run: &CaseRun) -> (&[u8], &[u8]) {
    match &run.execution {
        Some(result) => (result.stdout.as_slice(), result.stderr.as_slice()),
        None => Default::default(),
    }
}

/// Output as shown to the user: lossy UTF-8 without trailing newlines.
fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(strip_trailing_newlines(bytes)).into_owned()
}

fn widest_line(blocks: &[&str]) -> usize {
    blocks
        .iter()
        .flat_map(|block| block.split('\n'))
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
}

fn pad(line: &str, width: usize) -> String {
    " ".repeat(width.saturating_sub(line.width()))
}

fn millis(duration: std::time::Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
