#![cfg(unix)]
//! End-to-end runs through the driver with an uncolored in-memory reporter.

mod common;

use std::fs;

use common::{Fixture, HANG};
use golden_harness::{ComparisonMode, Harness, HarnessError, Reporter, TIMEOUT_MESSAGE};
use termcolor::Buffer;

fn reporter() -> Reporter<Buffer> {
    Reporter::new(Buffer::no_color(), false)
}

fn text(reporter: Reporter<Buffer>) -> String {
    String::from_utf8(reporter.into_inner().into_inner()).unwrap()
}

#[test]
fn matching_output_passes() {
    let fx = Fixture::new();
    fx.case("arith", "add.in", "echo 4\n", Some("4\n"), None);

    let harness = Harness::new(fx.config()).unwrap();
    let mut r = reporter();
    let stats = harness.run_all(&mut r).unwrap();

    assert_eq!(stats.total(), 1);
    assert_eq!(stats.passed(), 1);
    assert!(stats.all_passed());
    let out = text(r);
    assert!(out.contains("Arith"));
    assert!(out.contains("Passed all 1 cases"));
    assert!(out.contains("You pass everything"));
}

#[test]
fn missing_golden_files_expect_silence() {
    let fx = Fixture::new();
    fx.case("core", "quiet.in", "true\n", None, None);
    fx.case("core", "noisy.in", "echo hi\n", None, None);
    fx.case("core", "warns.in", "echo careful >&2\n", None, None);

    let harness = Harness::new(fx.config()).unwrap();
    let stats = harness.run_all(&mut reporter()).unwrap();

    // noisy.in = 0, quiet.in = 1, warns.in = 2
    assert_eq!(stats.passed(), 1);
    assert_eq!(stats.failed(), &[0, 2]);
}

#[test]
fn infinite_loop_is_recorded_as_failure() {
    let fx = Fixture::new();
    fx.case("core", "loop.in", HANG, None, None);

    let harness = Harness::new(fx.config()).unwrap();
    let case = harness.suite().case(0).unwrap();
    let run = harness.run_case(0, case);

    assert!(!run.passed());
    let result = run.execution.as_ref().unwrap();
    assert!(result.timed_out());
    assert_eq!(result.stdout, TIMEOUT_MESSAGE.as_bytes());

    let stats = harness.run_all(&mut reporter()).unwrap();
    assert!(!stats.all_passed());
    assert_eq!(stats.failed(), &[0]);
}

#[test]
fn syntax_error_case_passes_in_both_modes() {
    let fx = Fixture::new();
    fx.case("parse", "bad.in", "printf 'syntax error' >&2\n", None, Some("syntax error"));

    for mode in [ComparisonMode::Exact, ComparisonMode::SyntaxOnly] {
        let mut config = fx.config();
        config.mode = mode;
        let harness = Harness::new(config).unwrap();
        let stats = harness.run_all(&mut reporter()).unwrap();
        assert!(stats.all_passed(), "{mode} mode should pass");
    }
}

#[test]
fn syntax_only_mode_ignores_stdout_differences() {
    let fx = Fixture::new();
    fx.case("parse", "ok.in", "echo whatever\n", Some("expected\n"), None);

    let mut config = fx.config();
    config.mode = ComparisonMode::SyntaxOnly;
    let stats = Harness::new(config).unwrap().run_all(&mut reporter()).unwrap();
    assert!(stats.all_passed());

    let stats = Harness::new(fx.config()).unwrap().run_all(&mut reporter()).unwrap();
    assert!(!stats.all_passed());
}

#[test]
fn numbering_matches_between_full_and_single_runs() {
    let fx = Fixture::new();
    fx.case("b-second", "one.in", "echo 1\n", Some("1"), None);
    fx.case("b-second", "two.in", "echo wrong\n", Some("2"), None);
    fx.case("a-first", "x.in", "echo x\n", Some("x\n\n"), None);
    fx.case("a-first", "y.in", "echo nope\n", Some("y"), None);
    fx.case("c-third", "z.in", "echo z >&2\n", None, Some("z"));

    let harness = Harness::new(fx.config()).unwrap();
    let stats = harness.run_all(&mut reporter()).unwrap();
    assert_eq!(stats.total(), 5);
    assert_eq!(stats.failed(), &[1, 3]);
    assert_eq!(stats.passed() + stats.failed().len(), stats.total());

    for index in 0..harness.suite().len() {
        let passed = harness.run_one(index, &mut reporter()).unwrap();
        assert_eq!(passed, !stats.failed().contains(&index), "case {index}");
    }
}

#[test]
fn detailed_run_shows_source_and_side_by_side_diff() {
    let fx = Fixture::new();
    fx.case("arith", "a.in", "echo 1\n", Some("1\n"), None);
    fx.case("arith", "b.in", "echo 2\n", Some("2\n"), None);
    fx.case("arith", "c.in", "echo 5\necho oops >&2\n", Some("4\n"), None);

    let harness = Harness::new(fx.config()).unwrap();
    let mut r = reporter();
    let passed = harness.run_one(2, &mut r).unwrap();

    assert!(!passed);
    let out = text(r);
    assert!(out.contains("01| echo 5\n02| echo oops >&2\n"));
    let stdout_at = out.find("=== Stdout === [Expected | Actual]").unwrap();
    let stderr_at = out.find("=== Stderr === [Expected | Actual]").unwrap();
    assert!(stdout_at < stderr_at);
    assert!(out[stdout_at..stderr_at].contains("4  |  5"));
    assert!(out[stderr_at..].contains("  |  oops"));
    assert!(out.contains("\u{2717} Test Failed"));
}

#[test]
fn out_of_range_case_is_rejected() {
    let fx = Fixture::new();
    fx.case("arith", "a.in", "echo 1\n", Some("1\n"), None);

    let harness = Harness::new(fx.config()).unwrap();
    let err = harness.run_one(1, &mut reporter()).unwrap_err();
    assert!(matches!(err, HarnessError::CaseIndex { index: 1, total: 1 }));
}

#[test]
fn unlaunchable_binary_fails_each_case_without_aborting() {
    let fx = Fixture::new();
    fx.case("core", "a.in", "", None, None);
    fx.case("core", "b.in", "", None, None);

    let mut config = fx.config();
    config.binary = fx.root().join("missing-binary");
    let harness = Harness::new(config).unwrap();
    let mut r = reporter();
    let stats = harness.run_all(&mut r).unwrap();

    assert_eq!(stats.total(), 2);
    assert_eq!(stats.failed(), &[0, 1]);
    assert!(text(r).contains("Failed test cases 0 1"));

    let run = harness.run_case(0, harness.suite().case(0).unwrap());
    assert!(run.execution.is_none());
    assert!(matches!(run.error, Some(HarnessError::Spawn { .. })));
}

#[test]
fn exit_on_fail_stops_after_first_failure() {
    let fx = Fixture::new();
    fx.case("core", "a.in", "echo 1\n", Some("1"), None);
    fx.case("core", "b.in", "echo 2\n", Some("nope"), None);
    fx.case("core", "c.in", "echo 3\n", Some("3"), None);
    fx.case("more", "d.in", "echo 4\n", Some("4"), None);

    let mut config = fx.config();
    config.exit_on_fail = true;
    let mut r = reporter();
    let stats = Harness::new(config).unwrap().run_all(&mut r).unwrap();

    assert_eq!(stats.total(), 2);
    assert_eq!(stats.failed(), &[1]);
    let out = text(r);
    assert!(out.contains("Test failure caught. Stopping the run and reporting."));
    assert!(!out.contains("More\n"));
    assert!(out.contains("Total:\t2"));
}

#[test]
fn verbose_mode_prints_a_line_per_case() {
    let fx = Fixture::new();
    fx.case("core", "first-case.in", "echo 1\n", Some("1"), None);
    fx.case("core", "second-case.in", "echo 2\n", Some("2"), None);
    fx.case("core", "third-case.in", "echo 5\n", Some("4"), None);

    let mut config = fx.config();
    config.verbose = true;
    let harness = Harness::new(config).unwrap();
    let mut r = Reporter::new(Buffer::no_color(), true);
    harness.run_all(&mut r).unwrap();

    let out = text(r);
    assert!(out.contains("First Case.in"));
    assert!(out.contains("Second Case.in"));
    assert!(out.contains(" ms\n"));
    assert_eq!(out.matches("==== Expected").count(), 1);

    let third = out.find("Third Case.in").unwrap();
    let block = &out[third..];
    assert!(block.contains("==== Expected ==========================\n4\n"));
    assert!(block.contains("==== Output ============================\n5\n"));
    assert!(block.contains("==== Test Case =========================\necho 5\n"));
}

#[test]
fn unreadable_golden_file_fails_only_that_case() {
    let fx = Fixture::new();
    fx.case("core", "a.in", "echo 1\n", Some("1\n"), None);
    fx.case("core", "b.in", "echo 2\n", Some("2\n"), None);
    let harness = Harness::new(fx.config()).unwrap();

    let golden = fx.cases_root().join("core/a.in.outp");
    fs::remove_file(&golden).unwrap();
    fs::create_dir(&golden).unwrap();

    let run = harness.run_case(0, harness.suite().case(0).unwrap());
    assert!(!run.passed());
    assert!(run.execution.is_some());
    assert!(matches!(run.error, Some(HarnessError::ExpectedFile { .. })));

    let mut r = reporter();
    let stats = harness.run_all(&mut r).unwrap();
    assert_eq!(stats.total(), 2);
    assert_eq!(stats.failed(), &[0]);
    assert!(text(r).contains("Failed test cases 0"));
}

#[test]
fn detailed_run_survives_a_vanished_input() {
    let fx = Fixture::new();
    let input = fx.case("core", "gone.in", "echo 1\n", Some("1\n"), None);
    let harness = Harness::new(fx.config()).unwrap();
    fs::remove_file(&input).unwrap();

    let mut r = reporter();
    let passed = harness.run_one(0, &mut r).unwrap();

    assert!(!passed);
    let out = text(r);
    assert!(out.contains("Gone.in [????]"));
    assert!(!out.contains("01|"));
    assert!(out.contains("\u{2717} Test Failed"));
}

#[test]
fn missing_cases_root_aborts_before_running() {
    let fx = Fixture::new();
    let mut config = fx.config();
    config.cases_root = fx.root().join("absent");
    assert!(matches!(
        Harness::new(config),
        Err(HarnessError::Discovery { .. })
    ));
}
