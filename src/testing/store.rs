use crate::error::TestingError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// A named test: what to feed the program and what it should print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// Test cases stored as `<name>.json` files in one directory.
#[derive(Debug, Clone)]
pub struct TestStore {
    dir: PathBuf,
}

impl TestStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, name: &str, case: &TestCase) -> Result<PathBuf, TestingError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir).map_err(|source| TestingError::Store {
            path: self.dir.clone(),
            source,
        })?;
        let json = serde_json::to_string_pretty(case).map_err(|e| TestingError::MalformedTestCase {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|source| TestingError::Store {
            path: path.clone(),
            source,
        })?;
        info!(test = name, path = %path.display(), "Saved test case");
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<TestCase, TestingError> {
        let path = self.path_for(name)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(TestingError::TestNotFound(name.to_string()));
            }
            Err(source) => return Err(TestingError::Store { path, source }),
        };
        serde_json::from_str(&contents).map_err(|e| TestingError::MalformedTestCase {
            name: name.to_string(),
            message: e.to_string(),
        })
    }

    /// Names of all stored tests, sorted. A missing directory holds no tests.
    pub fn list(&self) -> Result<Vec<String>, TestingError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(TestingError::Store {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| TestingError::Store {
                    path: self.dir.clone(),
                    source,
                })?
                .path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, TestingError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(TestingError::InvalidTestName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }
}
