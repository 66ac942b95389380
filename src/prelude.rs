//! Prelude module for convenient imports
//!
//! Re-exports the types most programs need to load, generate and test a flowchart.

// Flowchart model
pub use crate::flow::{Flowchart, IntoFlowchart};

// Generation and analysis
pub use crate::analysis::{ConcurrencyReport, analyze, is_potentially_non_deterministic};
pub use crate::codegen::{Generator, Language};

// Testing
pub use crate::testing::{InterpreterSandbox, Sandbox, SamplingTester, TestCase, TestStore};

// Configuration
pub use crate::settings::Settings;

// Error types
pub use crate::error::{FlowConversionError, GenerateError, RenderError, SandboxError, TestingError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
