use super::language::file_extension;
use crate::error::GenerateError;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Writes generated programs to uniquely named files for later download.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves `code` as `generated_code_<millis>.<ext>`, adding a numeric suffix
    /// when a file with that name already exists.
    pub fn persist(&self, code: &str, language_id: &str) -> Result<PathBuf, GenerateError> {
        fs::create_dir_all(&self.dir).map_err(|source| GenerateError::ArtifactWrite {
            path: self.dir.clone(),
            source,
        })?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let extension = file_extension(language_id);

        let mut attempt = 0u32;
        loop {
            let file_name = if attempt == 0 {
                format!("generated_code_{}.{}", millis, extension)
            } else {
                format!("generated_code_{}_{}.{}", millis, attempt, extension)
            };
            let path = self.dir.join(file_name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(code.as_bytes())
                        .map_err(|source| GenerateError::ArtifactWrite {
                            path: path.clone(),
                            source,
                        })?;
                    info!(path = %path.display(), "Saved generated code");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(source) => return Err(GenerateError::ArtifactWrite { path, source }),
            }
        }
    }
}
