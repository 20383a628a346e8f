//! Test summary extraction from raw job logs.
//!
//! Understands the Maven Surefire/Failsafe summary: a `Results :` marker
//! followed by `Tests run: R, Failures: F, Errors: E, Skipped: S`. Multi-module
//! builds print one block per module; the blocks are summed. Per-class
//! `Tests run:` lines printed before a marker are ignored.

use std::sync::OnceLock;

use buildscan_core::TestsInformation;
use regex::Regex;

fn ansi_escape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid ANSI regex"))
}

fn results_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bResults\s*:\s*$").expect("valid marker regex"))
}

fn tests_run_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Tests run:\s*(\d+),\s*Failures:\s*(\d+),\s*Errors:\s*(\d+),\s*Skipped:\s*(\d+)")
            .expect("valid summary regex")
    })
}

/// Parse a raw job log into test counts. Logs without a summary yield zeros.
pub fn parse_tests_information(log: &str) -> TestsInformation {
    let clean = ansi_escape().replace_all(log, "");
    let mut info = TestsInformation::default();
    let mut in_results = false;

    for line in clean.split(|c: char| c == '\n' || c == '\r') {
        let line = line.trim_end();
        if results_marker().is_match(line) {
            in_results = true;
            continue;
        }
        if !in_results {
            continue;
        }
        let Some(caps) = tests_run_line().captures(line) else {
            continue;
        };
        let count = |i: usize| caps[i].parse::<u32>().unwrap_or(0);
        let (run, failures, errors, skipped) = (count(1), count(2), count(3), count(4));

        let failing = failures.saturating_add(errors);
        info.running = info.running.saturating_add(run);
        info.failing = info.failing.saturating_add(failing);
        info.skipped = info.skipped.saturating_add(skipped);
        info.passing = info
            .passing
            .saturating_add(run.saturating_sub(failing).saturating_sub(skipped));
        in_results = false;
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAVEN_FAILURE: &str = "\
[INFO] Running fr.inria.FooTest
Tests run: 4, Failures: 1, Errors: 0, Skipped: 0, Time elapsed: 0.2 sec <<< FAILURE! - in fr.inria.FooTest
Running fr.inria.BarTest
Tests run: 3, Failures: 0, Errors: 1, Skipped: 1, Time elapsed: 0.1 sec
\r
Results :\r
\r
Failed tests: \r
  FooTest.shouldWork:42 expected:<1> but was:<2>\r
\r
Tests run: 7, Failures: 1, Errors: 1, Skipped: 1\r
\r
[INFO] BUILD FAILURE
";

    #[test]
    fn test_parses_maven_summary_block() {
        let info = parse_tests_information(MAVEN_FAILURE);
        assert_eq!(info.running, 7);
        assert_eq!(info.failing, 2);
        assert_eq!(info.skipped, 1);
        assert_eq!(info.passing, 4);
    }

    #[test]
    fn test_sums_module_blocks_and_strips_ansi() {
        let log = "\
\x1b[1;34m[INFO]\x1b[m Results:
[INFO] Tests run: 10, Failures: 0, Errors: 0, Skipped: 2
[INFO] Building module-b
[INFO] Tests run: 5, Failures: 5, Errors: 0, Skipped: 0, Time elapsed: 1 s - in BTest
\x1b[1;34m[INFO]\x1b[m Results:
\x1b[1;31m[ERROR]\x1b[m Tests run: 5, Failures: 3, Errors: 0, Skipped: 0
";
        let info = parse_tests_information(log);
        assert_eq!(info.running, 15);
        assert_eq!(info.failing, 3);
        assert_eq!(info.skipped, 2);
        assert_eq!(info.passing, 10);
    }

    #[test]
    fn test_log_without_summary_has_no_failures() {
        let info = parse_tests_information("[ERROR] COMPILATION ERROR\n[ERROR] Foo.java:[3,1] ';' expected\n");
        assert_eq!(info, TestsInformation::default());
    }

    #[test]
    fn test_per_class_lines_alone_are_ignored() {
        let log = "Tests run: 4, Failures: 2, Errors: 0, Skipped: 0, Time elapsed: 0.2 sec\n";
        assert_eq!(parse_tests_information(log).failing, 0);
    }
}
