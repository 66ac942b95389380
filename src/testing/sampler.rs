use super::coverage::{self, Coverage};
use super::sandbox::{Sandbox, Script};
use super::store::TestStore;
use crate::analysis;
use crate::codegen::{Generator, Language};
use crate::error::{SandboxError, TestingError};
use crate::flow::Flowchart;
use rayon::prelude::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{Builder, TempPath};
use tracing::{debug, info, warn};

pub const DEFAULT_SAMPLE_COUNT: usize = 10;

#[derive(Debug, Clone)]
pub struct TesterConfig {
    /// Number of independent runs for a potentially non-deterministic flowchart.
    pub sample_count: usize,
    /// Where temporary programs are written. `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            temp_dir: None,
        }
    }
}

/// Outcome of one sample run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleResult {
    pub output: String,
    pub success: bool,
}

/// Everything one sampling run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingReport {
    /// Samples that executed to completion. Failed executions are dropped.
    pub samples: Vec<SampleResult>,
    /// Every sample that was issued, including the dropped ones.
    pub tested_combinations: usize,
    pub total_combinations: f64,
}

impl SamplingReport {
    pub fn passed(&self) -> usize {
        self.samples.iter().filter(|s| s.success).count()
    }

    pub fn failed(&self) -> usize {
        self.samples.len() - self.passed()
    }

    pub fn coverage(&self, max_operations: u32) -> Result<Coverage, TestingError> {
        coverage::estimate(self.tested_combinations, self.total_combinations, max_operations)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestOutcome {
    pub result_text: String,
    pub non_deterministic: bool,
    /// Present iff the flowchart was flagged non-deterministic.
    pub sampling: Option<SamplingReport>,
}

/// Runs stored test cases against flowcharts by executing the generated
/// Python program in a sandbox.
pub struct SamplingTester<S: Sandbox> {
    sandbox: S,
    store: TestStore,
    generator: Generator,
    config: TesterConfig,
}

impl<S: Sandbox> SamplingTester<S> {
    pub fn new(sandbox: S, store: TestStore) -> Self {
        Self {
            sandbox,
            store,
            generator: Generator::default(),
            config: TesterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TesterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn sandbox(&self) -> &S {
        &self.sandbox
    }

    pub fn store(&self) -> &TestStore {
        &self.store
    }

    /// Runs the test named `test_name` once. If the flowchart looks
    /// non-deterministic, also runs a sampling pass and reports it.
    pub fn run_test(&self, flowchart: &Flowchart, test_name: &str) -> Result<TestOutcome, TestingError> {
        let case = self.store.load(test_name)?;
        let output = self.execute_once(flowchart, &case.input)?;
        let non_deterministic = analysis::is_potentially_non_deterministic(flowchart);

        if non_deterministic {
            let report = self.run_sampling(flowchart, &case.input, &case.expected_output);
            let result_text = format!(
                "Result: {}\nExpected: {}\n\nThis program appears to be non-deterministic. Ran {} samples: {} passed, {} failed.",
                output,
                case.expected_output,
                report.tested_combinations,
                report.passed(),
                report.failed()
            );
            return Ok(TestOutcome {
                result_text,
                non_deterministic,
                sampling: Some(report),
            });
        }

        let verdict = if outputs_match(&output, &case.expected_output) {
            "PASSED"
        } else {
            "FAILED"
        };
        info!(test = test_name, verdict, "Test finished");
        Ok(TestOutcome {
            result_text: format!(
                "Result: {}\nExpected: {}\n\nTest {}",
                output, case.expected_output, verdict
            ),
            non_deterministic,
            sampling: None,
        })
    }

    /// Executes `sample_count` independent generate-and-run cycles in parallel.
    ///
    /// This only samples whatever interleavings the scheduler happens to
    /// produce; it does not enumerate them.
    pub fn run_sampling(&self, flowchart: &Flowchart, input: &str, expected_output: &str) -> SamplingReport {
        let issued = self.config.sample_count;
        let total_combinations = coverage::total_combinations(flowchart);

        let samples: Vec<SampleResult> = (0..issued)
            .into_par_iter()
            .filter_map(|index| match self.execute_once(flowchart, input) {
                Ok(output) => Some(SampleResult {
                    success: outputs_match(&output, expected_output),
                    output,
                }),
                Err(e) => {
                    warn!(sample = index, error = %e, "Sample failed, excluding it");
                    None
                }
            })
            .collect();

        let report = SamplingReport {
            samples,
            tested_combinations: issued,
            total_combinations,
        };
        info!(
            issued,
            completed = report.samples.len(),
            passed = report.passed(),
            "Sampling finished"
        );
        report
    }

    /// Kills the most recently started program if it is still running.
    pub fn stop_current_test(&self) -> bool {
        self.sandbox.cancel_current()
    }

    fn execute_once(&self, flowchart: &Flowchart, input: &str) -> Result<String, TestingError> {
        let source = self.generator.render(flowchart, Language::Python)?;
        let path = self.write_temp_program(&source)?;
        debug!(path = %path.display(), "Running generated program");

        let execution = self.sandbox.execute(
            &Script {
                path: &path,
                source: &source,
            },
            input,
        )?;
        if !execution.success() {
            return Err(SandboxError::ExecutionFailure {
                code: execution.exit_code,
                stderr: execution.stderr,
            }
            .into());
        }
        Ok(execution.stdout)
    }

    /// The returned path deletes the file when dropped.
    fn write_temp_program(&self, source: &str) -> Result<TempPath, TestingError> {
        let mut builder = Builder::new();
        builder.prefix("test_").suffix(".py");
        let mut file = match &self.config.temp_dir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(TestingError::TempArtifact)?;
                builder.tempfile_in(dir)
            }
            None => builder.tempfile(),
        }
        .map_err(TestingError::TempArtifact)?;

        file.write_all(source.as_bytes())
            .and_then(|()| file.flush())
            .map_err(TestingError::TempArtifact)?;
        Ok(file.into_temp_path())
    }
}

fn outputs_match(actual: &str, expected: &str) -> bool {
    actual.trim() == expected.trim()
}

#[cfg(test)]
mod tests {
    use super::outputs_match;

    #[test]
    fn comparison_ignores_surrounding_whitespace() {
        assert!(outputs_match("5\n", "5"));
        assert!(outputs_match("  5 ", "\n5\n"));
        assert!(!outputs_match("5\n6\n", "5"));
    }
}
