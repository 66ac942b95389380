//! # Douki - Flowchart to Concurrent Program Generator
//!
//! **Douki** turns flowcharts made of several concurrent threads into runnable
//! programs. Every access to a shared variable is wrapped in a lock, so the
//! generated code is free of low-level data races while its output may still
//! depend on how the threads interleave.
//!
//! ## Core Workflow
//!
//! 1.  **Load a Flowchart**: Parse editor JSON with `Flowchart::from_editor_json`, or
//!     implement `IntoFlowchart` for your own format.
//! 2.  **Generate**: Use a `Generator` to render Python or C# source, optionally
//!     saving each program to an artifact directory.
//! 3.  **Analyze**: `analysis::is_potentially_non_deterministic` flags flowcharts whose
//!     threads share variables in a conflicting way.
//! 4.  **Test**: A `SamplingTester` runs stored test cases through an interpreter and,
//!     for flagged flowcharts, samples several runs and estimates coverage.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use douki::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let json = std::fs::read_to_string("flowchart.json")?;
//!     let flowchart = Flowchart::from_editor_json(&json)?;
//!
//!     let generator = Generator::builder().artifact_dir("generated_code").build();
//!     let code = generator.generate(&flowchart, "python")?;
//!     println!("{}", code);
//!
//!     if is_potentially_non_deterministic(&flowchart) {
//!         let tester = SamplingTester::new(InterpreterSandbox::new("python3"), TestStore::new("test_cases"));
//!         let outcome = tester.run_test(&flowchart, "basic")?;
//!         println!("{}", outcome.result_text);
//!         if let Some(report) = outcome.sampling {
//!             println!("Coverage: {}%", report.coverage(5)?.percentage);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod codegen;
pub mod error;
pub mod flow;
pub mod prelude;
pub mod settings;
pub mod testing;
