use crate::codegen::Generator;
use crate::testing::{
    DEFAULT_SAMPLE_COUNT, InterpreterSandbox, SamplingTester, TestStore, TesterConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration shared by the tools. Every field is optional in the
/// JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Where generated programs are saved. `None` disables saving.
    pub artifact_dir: Option<PathBuf>,
    pub tests_dir: PathBuf,
    pub temp_dir: Option<PathBuf>,
    pub interpreter: String,
    pub interpreter_args: Vec<String>,
    pub sample_count: usize,
    pub timeout_ms: Option<u64>,
    pub allow_partial_backends: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            artifact_dir: Some(PathBuf::from("generated_code")),
            tests_dir: PathBuf::from("test_cases"),
            temp_dir: None,
            interpreter: "python3".to_string(),
            interpreter_args: Vec::new(),
            sample_count: DEFAULT_SAMPLE_COUNT,
            timeout_ms: None,
            allow_partial_backends: false,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn generator(&self) -> Generator {
        let mut builder = Generator::builder().allow_partial_backends(self.allow_partial_backends);
        if let Some(dir) = &self.artifact_dir {
            builder = builder.artifact_dir(dir);
        }
        builder.build()
    }

    pub fn sandbox(&self) -> InterpreterSandbox {
        InterpreterSandbox::new(self.interpreter.clone())
            .with_args(self.interpreter_args.clone())
            .with_timeout(self.timeout())
    }

    pub fn test_store(&self) -> TestStore {
        TestStore::new(self.tests_dir.clone())
    }

    pub fn tester_config(&self) -> TesterConfig {
        TesterConfig {
            sample_count: self.sample_count,
            temp_dir: self.temp_dir.clone(),
        }
    }

    pub fn tester(&self) -> SamplingTester<InterpreterSandbox> {
        SamplingTester::new(self.sandbox(), self.test_store()).with_config(self.tester_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"interpreter": "python", "timeoutMs": 2500}"#).unwrap();
        assert_eq!(settings.interpreter, "python");
        assert_eq!(settings.timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(settings.sample_count, 10);
        assert_eq!(settings.tests_dir, PathBuf::from("test_cases"));
    }

    #[test]
    fn null_artifact_dir_disables_saving() {
        let settings: Settings = serde_json::from_str(r#"{"artifactDir": null}"#).unwrap();
        assert_eq!(settings.artifact_dir, None);
    }
}
