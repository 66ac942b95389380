//! Running stored test cases against generated programs.

pub mod coverage;
mod sampler;
pub mod sandbox;
mod store;

pub use coverage::Coverage;
pub use sampler::{
    DEFAULT_SAMPLE_COUNT, SampleResult, SamplingReport, SamplingTester, TestOutcome, TesterConfig,
};
pub use sandbox::{Execution, InterpreterSandbox, Sandbox, Script};
pub use store::{TestCase, TestStore};
