//! Tester tests
//!
//! Drives `SamplingTester` with an in-process sandbox so no interpreter is needed.
//!
mod common;
use common::*;
use douki::error::{SandboxError, TestingError};
use douki::flow::Flowchart;
use douki::testing::{
    Execution, Sandbox, SamplingTester, Script, TestCase, TestStore, TesterConfig, coverage,
};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Answers every execution with the next scripted result, cycling.
struct FakeSandbox {
    replies: Vec<Result<&'static str, i32>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<SeenScript>>,
    cancelled: AtomicBool,
}

struct SeenScript {
    path: PathBuf,
    existed: bool,
    on_disk: String,
    source: String,
    stdin: String,
}

impl FakeSandbox {
    fn printing(output: &'static str) -> Self {
        Self::scripted(vec![Ok(output)])
    }

    fn scripted(replies: Vec<Result<&'static str, i32>>) -> Self {
        Self {
            replies,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            cancelled: AtomicBool::new(false),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Sandbox for FakeSandbox {
    fn execute(&self, script: &Script<'_>, stdin: &str) -> Result<Execution, SandboxError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(SeenScript {
            path: script.path.to_path_buf(),
            existed: script.path.exists(),
            on_disk: std::fs::read_to_string(script.path).unwrap_or_default(),
            source: script.source.to_string(),
            stdin: stdin.to_string(),
        });
        Ok(match self.replies[call % self.replies.len()] {
            Ok(stdout) => Execution {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            },
            Err(code) => Execution {
                stdout: String::new(),
                stderr: "Traceback: boom".to_string(),
                exit_code: Some(code),
            },
        })
    }

    fn cancel_current(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }
}

fn tester_with(
    sandbox: FakeSandbox,
    dir: &tempfile::TempDir,
    cases: &[(&str, TestCase)],
) -> SamplingTester<FakeSandbox> {
    let store = TestStore::new(dir.path().join("tests"));
    for (name, case) in cases {
        store.save(name, case).unwrap();
    }
    SamplingTester::new(sandbox, store).with_config(TesterConfig {
        sample_count: 10,
        temp_dir: Some(dir.path().join("temp")),
    })
}

/// Two threads with five blocks each: 5^2 = 25 combinations.
fn five_by_two() -> Flowchart {
    let thread = |id: &str| {
        chain(
            id,
            vec![
                start(&format!("{}s", id)),
                assign(&format!("{}a", id), "x", 1),
                output(&format!("{}o", id), "x"),
                assign(&format!("{}b", id), "x", 2),
                end(&format!("{}e", id)),
            ],
        )
    };
    Flowchart::new(vec![thread("1"), thread("2")], vars(&["x"]))
}

#[cfg(test)]
mod run_test_tests {
    use super::*;

    #[test]
    fn test_deterministic_pass() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(
            FakeSandbox::printing("5\n"),
            &dir,
            &[("basic", TestCase::new("", "5"))],
        );

        let outcome = tester.run_test(&create_assign_then_print(), "basic").unwrap();
        assert!(!outcome.non_deterministic);
        assert!(outcome.sampling.is_none());
        assert_eq!(outcome.result_text, "Result: 5\n\nExpected: 5\n\nTest PASSED");
        assert_eq!(tester.sandbox().calls(), 1);
    }

    #[test]
    fn test_deterministic_fail() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(
            FakeSandbox::printing("4"),
            &dir,
            &[("basic", TestCase::new("", "5"))],
        );
        let outcome = tester.run_test(&create_assign_then_print(), "basic").unwrap();
        assert!(outcome.result_text.ends_with("Test FAILED"));
    }

    #[test]
    fn test_input_reaches_the_program() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(
            FakeSandbox::printing("1"),
            &dir,
            &[("small", TestCase::new("2\n", "1"))],
        );
        tester.run_test(&create_branching(), "small").unwrap();

        let seen = tester.sandbox().seen.lock().unwrap();
        assert_eq!(seen[0].stdin, "2\n");
        assert!(seen[0].source.contains("x = int(input())"));
    }

    #[test]
    fn test_program_file_exists_only_during_execution() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(
            FakeSandbox::printing("5"),
            &dir,
            &[("basic", TestCase::new("", "5"))],
        );
        tester.run_test(&create_assign_then_print(), "basic").unwrap();

        let seen = tester.sandbox().seen.lock().unwrap();
        let script = &seen[0];
        assert!(script.existed);
        assert_eq!(script.on_disk, script.source);
        assert_eq!(script.on_disk, ASSIGN_THEN_PRINT_PY);
        assert!(script.path.starts_with(dir.path().join("temp")));
        assert_eq!(script.path.extension().unwrap(), "py");
        assert!(!script.path.exists());
    }

    #[test]
    fn test_missing_test_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(FakeSandbox::printing("5"), &dir, &[]);
        let result = tester.run_test(&create_assign_then_print(), "nope");
        assert!(matches!(result, Err(TestingError::TestNotFound(name)) if name == "nope"));
        assert_eq!(tester.sandbox().calls(), 0);
    }

    #[test]
    fn test_failing_program_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(
            FakeSandbox::scripted(vec![Err(1)]),
            &dir,
            &[("basic", TestCase::new("", "5"))],
        );
        let result = tester.run_test(&create_assign_then_print(), "basic");
        match result {
            Err(TestingError::Sandbox(SandboxError::ExecutionFailure { code, stderr })) => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("boom"));
            }
            other => panic!("expected an execution failure, got {:?}", other),
        }
        // The temp program is gone even on the error path.
        let seen = tester.sandbox().seen.lock().unwrap();
        assert!(!seen[0].path.exists());
    }

    #[test]
    fn test_non_deterministic_runs_samples() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(
            FakeSandbox::printing("1"),
            &dir,
            &[("race", TestCase::new("", "1"))],
        );

        let outcome = tester.run_test(&create_writer_reader(), "race").unwrap();
        assert!(outcome.non_deterministic);
        assert!(
            outcome
                .result_text
                .contains("This program appears to be non-deterministic.")
        );

        let report = outcome.sampling.expect("sampling report");
        assert_eq!(report.tested_combinations, 10);
        assert_eq!(report.samples.len(), 10);
        assert_eq!(report.passed(), 10);
        // One initial run plus ten samples.
        assert_eq!(tester.sandbox().calls(), 11);
    }
}

#[cfg(test)]
mod sampling_tests {
    use super::*;

    #[test]
    fn test_failed_samples_are_excluded_but_counted() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(
            FakeSandbox::scripted(vec![Ok("0\n"), Err(2)]),
            &dir,
            &[],
        );
        let report = tester.run_sampling(&create_writer_reader(), "", "0");

        assert_eq!(report.tested_combinations, 10);
        assert_eq!(report.samples.len(), 5);
        assert!(report.samples.iter().all(|s| s.success && s.output == "0\n"));
        assert_eq!(report.failed(), 0);
    }

    #[test]
    fn test_mixed_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(FakeSandbox::scripted(vec![Ok("1"), Ok("0")]), &dir, &[]);
        let report = tester.run_sampling(&create_writer_reader(), "", "1");
        assert_eq!(report.passed(), 5);
        assert_eq!(report.failed(), 5);
    }

    #[test]
    fn test_sample_count_is_configurable() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(FakeSandbox::printing("1"), &dir, &[]).with_config(TesterConfig {
            sample_count: 3,
            temp_dir: Some(dir.path().join("temp")),
        });
        let report = tester.run_sampling(&create_writer_reader(), "", "1");
        assert_eq!(report.tested_combinations, 3);
        assert_eq!(tester.sandbox().calls(), 3);
    }

    #[test]
    fn test_every_sample_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(FakeSandbox::printing("1"), &dir, &[]);
        tester.run_sampling(&create_writer_reader(), "", "1");

        let seen = tester.sandbox().seen.lock().unwrap();
        assert_eq!(seen.len(), 10);
        assert!(seen.iter().all(|s| s.existed && !s.path.exists()));
        let leftovers = std::fs::read_dir(dir.path().join("temp")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_coverage_of_ten_samples_over_twenty_five() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(FakeSandbox::printing("1"), &dir, &[]);
        let report = tester.run_sampling(&five_by_two(), "", "1");

        assert_eq!(report.total_combinations, 25.0);
        let coverage = report.coverage(5).unwrap();
        assert_eq!(coverage.tested_combinations, 10);
        assert_eq!(coverage.total_possible, 25.0);
        assert_eq!(coverage.percentage, 40);
    }

    #[test]
    fn test_coverage_range_is_checked() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(FakeSandbox::printing("1"), &dir, &[]);
        let report = tester.run_sampling(&five_by_two(), "", "1");
        assert!(matches!(report.coverage(0), Err(TestingError::CoverageRange(0))));
        assert!(matches!(report.coverage(21), Err(TestingError::CoverageRange(21))));
    }

    #[test]
    fn test_total_combinations_formula() {
        assert_eq!(coverage::total_combinations(&Flowchart::default()), 0.0);
        assert_eq!(coverage::total_combinations(&create_writer_reader()), 9.0);
        assert_eq!(coverage::total_combinations(&create_assign_then_print()), 4.0);
    }

    #[test]
    fn test_stop_current_test_delegates_to_sandbox() {
        let dir = tempfile::tempdir().unwrap();
        let tester = tester_with(FakeSandbox::printing("1"), &dir, &[]);
        assert!(tester.stop_current_test());
        assert!(!tester.stop_current_test());
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;

    #[test]
    fn test_save_load_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path().join("cases"));
        assert!(store.list().unwrap().is_empty());

        store.save("zeta", &TestCase::new("1\n", "2")).unwrap();
        store.save("alpha", &TestCase::new("", "ok")).unwrap();
        std::fs::write(dir.path().join("cases").join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
        assert_eq!(store.load("zeta").unwrap(), TestCase::new("1\n", "2"));
    }

    #[test]
    fn test_reads_editor_written_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("legacy.json"),
            r#"{"input": "3", "expectedOutput": "9"}"#,
        )
        .unwrap();
        let store = TestStore::new(dir.path());
        assert_eq!(store.load("legacy").unwrap().expected_output, "9");
    }

    #[test]
    fn test_malformed_case() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), r#"{"input": 3}"#).unwrap();
        let store = TestStore::new(dir.path());
        assert!(matches!(
            store.load("bad"),
            Err(TestingError::MalformedTestCase { .. })
        ));
    }
}
