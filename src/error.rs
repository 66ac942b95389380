use crate::codegen::Language;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when converting editor data into a `Flowchart`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowConversionError {
    #[error("Failed to parse flowchart JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid flowchart data: {0}")]
    ValidationError(String),

    #[error("Block '{block_id}' has an unknown type: '{type_name}'")]
    UnknownBlockType { block_id: String, type_name: String },

    #[error("Block '{block_id}' of type '{block_type}' is missing required property '{property}'")]
    MissingProperty {
        block_id: String,
        block_type: String,
        property: &'static str,
    },

    #[error("Block id '{block_id}' appears more than once in thread '{thread_id}'")]
    DuplicateBlockId { thread_id: String, block_id: String },
}

/// Errors raised by the emitter or a backend while rendering a program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error(
        "Block '{block_id}' in thread '{thread_id}' references undeclared variable '{variable}'"
    )]
    UndeclaredVariable {
        thread_id: String,
        block_id: String,
        variable: String,
    },

    #[error("'{name}' is not a valid {language} identifier")]
    InvalidIdentifier { name: String, language: Language },

    #[error(
        "Thread '{thread_id}' jumps back to block '{target_id}' from inside the loop at block '{loop_id}'; nested loops may only continue their innermost header"
    )]
    UnstructuredLoop {
        thread_id: String,
        loop_id: String,
        target_id: String,
    },
}

/// Errors that can occur during code generation.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Code generation failed for {language}: {source}")]
    GenerationFailure {
        language: Language,
        source: RenderError,
    },

    #[error("Could not write generated code to '{}': {source}", path.display())]
    ArtifactWrite { path: PathBuf, source: io::Error },
}

/// Errors reported by an execution sandbox.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Could not start interpreter '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    #[error("Script exited with {}: {stderr}", describe_exit(.code))]
    ExecutionFailure { code: Option<i32>, stderr: String },

    #[error("Script did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("I/O error while talking to the interpreter: {0}")]
    Io(#[from] io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by a signal)".to_string(),
    }
}

/// Errors that can occur while running tests against a flowchart.
#[derive(Error, Debug)]
pub enum TestingError {
    #[error("Test '{0}' not found")]
    TestNotFound(String),

    #[error("Invalid test name '{0}'")]
    InvalidTestName(String),

    #[error("Test case '{name}' is malformed: {message}")]
    MalformedTestCase { name: String, message: String },

    #[error("maxOperations must be between 1 and 20, got {0}")]
    CoverageRange(u32),

    #[error("Test execution failed: {0}")]
    Sandbox(#[from] SandboxError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("Test store error at '{}': {source}", path.display())]
    Store { path: PathBuf, source: io::Error },

    #[error("Could not prepare temporary program file: {0}")]
    TempArtifact(#[source] io::Error),
}
