use crate::error::{GenerateError, RenderError};
use crate::flow::Flowchart;
use ahash::AHashSet;
use itertools::Itertools;
use std::path::{Path, PathBuf};

mod artifact;
pub mod backend;
mod csharp;
pub mod emitter;
pub mod language;
mod partial;
mod python;
pub mod statement;
pub mod writer;

pub use artifact::ArtifactStore;
pub use backend::{Backend, SyntaxTemplates, backend_for, render_structured};
pub use csharp::CSharpBackend;
pub use emitter::Emitter;
pub use language::{Language, file_extension};
pub use partial::{CSkeletonBackend, PlaceholderBackend};
pub use python::PythonBackend;
pub use statement::{Program, ThreadBody, ThreadProgram};

/// Turns flowcharts into source text and optionally keeps a copy of every
/// generated program on disk.
pub struct Generator {
    artifacts: Option<ArtifactStore>,
    allow_partial: bool,
}

pub struct GeneratorBuilder {
    artifact_dir: Option<PathBuf>,
    allow_partial: bool,
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Self {
            artifact_dir: None,
            allow_partial: false,
        }
    }

    /// Persists every successfully generated program into `dir`.
    pub fn artifact_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.artifact_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Lets `generate` use the incomplete C, C++ and Java backends.
    pub fn allow_partial_backends(mut self, allow: bool) -> Self {
        self.allow_partial = allow;
        self
    }

    pub fn build(self) -> Generator {
        Generator {
            artifacts: self.artifact_dir.map(ArtifactStore::new),
            allow_partial: self.allow_partial,
        }
    }
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Generator {
    fn default() -> Self {
        GeneratorBuilder::new().build()
    }
}

impl Generator {
    pub fn builder() -> GeneratorBuilder {
        GeneratorBuilder::new()
    }

    /// Resolves a language id, failing before any rendering or file I/O.
    pub fn resolve_language(&self, language_id: &str) -> Result<Language, GenerateError> {
        match Language::from_id(language_id) {
            Some(language) if language.is_complete() || self.allow_partial => Ok(language),
            _ => Err(GenerateError::UnsupportedLanguage(language_id.to_string())),
        }
    }

    /// Generates source text for `flowchart` in the language named by
    /// `language_id` and, if configured, saves it as an artifact.
    ///
    /// The returned text depends only on the flowchart and the language; the
    /// artifact's file name carries the timestamp.
    pub fn generate(&self, flowchart: &Flowchart, language_id: &str) -> Result<String, GenerateError> {
        let language = self.resolve_language(language_id)?;
        let code = self.render(flowchart, language)?;
        if let Some(store) = &self.artifacts {
            store.persist(&code, language_id)?;
        }
        Ok(code)
    }

    /// Renders without persisting anything.
    pub fn render(&self, flowchart: &Flowchart, language: Language) -> Result<String, GenerateError> {
        let backend = backend_for(language);
        render_program(flowchart, backend.as_ref())
            .map_err(|source| GenerateError::GenerationFailure { language, source })
    }
}

/// Emits every thread of `flowchart` and renders the result with `backend`.
pub fn render_program(flowchart: &Flowchart, backend: &dyn Backend) -> Result<String, RenderError> {
    let variables: Vec<String> = flowchart.variables.iter().unique().cloned().collect();
    for variable in &variables {
        check_identifier(variable, backend)?;
    }

    let idents = thread_idents(flowchart);
    let helpers: AHashSet<String> = idents
        .iter()
        .flat_map(|ident| backend.thread_helpers(ident))
        .collect();
    if let Some(variable) = variables.iter().find(|v| helpers.contains(v.as_str())) {
        return Err(RenderError::InvalidIdentifier {
            name: variable.clone(),
            language: backend.language(),
        });
    }

    let threads = flowchart
        .threads
        .iter()
        .zip(idents)
        .map(|(thread, ident)| {
            Ok(ThreadProgram {
                thread_id: thread.id().to_string(),
                ident,
                body: Emitter::new(thread, &variables).emit()?,
            })
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    Ok(backend.render(&Program { variables, threads }))
}

/// Identifier-safe thread names, one per thread in order. Ids that sanitize
/// to the same text get a numeric suffix.
fn thread_idents(flowchart: &Flowchart) -> Vec<String> {
    let mut taken: AHashSet<String> = AHashSet::new();
    flowchart
        .threads
        .iter()
        .map(|thread| {
            let base = statement::sanitize_ident(thread.id());
            let mut ident = base.clone();
            let mut n = 2;
            while !taken.insert(ident.clone()) {
                ident = format!("{}_{}", base, n);
                n += 1;
            }
            ident
        })
        .collect()
}

fn check_identifier(name: &str, backend: &dyn Backend) -> Result<(), RenderError> {
    let mut chars = name.chars();
    let well_formed = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if well_formed && !backend.reserved_words().contains(&name) {
        Ok(())
    } else {
        Err(RenderError::InvalidIdentifier {
            name: name.to_string(),
            language: backend.language(),
        })
    }
}
