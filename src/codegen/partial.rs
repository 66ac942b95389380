//! Backends that only produce incomplete programs.
//!
//! They share the `Backend` contract but are not production-equivalent; the
//! generator refuses them unless partial output is explicitly allowed.

use super::backend::Backend;
use super::language::Language;
use super::statement::Program;
use super::writer::CodeWriter;

/// C backend producing the pthread scaffolding with placeholder thread bodies.
pub struct CSkeletonBackend;

impl Backend for CSkeletonBackend {
    fn language(&self) -> Language {
        Language::C
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        &[
            "auto", "break", "case", "char", "const", "continue", "default", "do", "double",
            "else", "enum", "extern", "float", "for", "goto", "if", "int", "long", "register",
            "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
            "union", "unsigned", "void", "volatile", "while", "lock", "main", "threads",
        ]
    }

    fn thread_helpers(&self, ident: &str) -> Vec<String> {
        vec![format!("thread_{}", ident)]
    }

    fn render(&self, program: &Program) -> String {
        let mut out = CodeWriter::new("    ");
        out.comment("// Generated from a flowchart (partial: thread bodies are not generated)");
        out.line("#include <stdio.h>");
        out.line("#include <stdlib.h>");
        out.line("#include <pthread.h>");
        out.blank();
        out.comment("// Shared variables");
        for variable in &program.variables {
            out.line(format!("int {} = 0;", variable));
        }
        out.blank();
        out.line("pthread_mutex_t lock;");
        out.blank();

        for thread in &program.threads {
            out.line(format!("void* thread_{}(void* arg) {{", thread.ident));
            out.indent();
            out.comment(format!("// Thread {} body is not generated for C", thread.thread_id));
            out.line("return NULL;");
            out.dedent();
            out.line("}");
            out.blank();
        }

        out.line("int main() {");
        out.indent();
        out.line("pthread_mutex_init(&lock, NULL);");
        out.blank();
        if !program.threads.is_empty() {
            out.line(format!("pthread_t threads[{}];", program.threads.len()));
            for (i, thread) in program.threads.iter().enumerate() {
                out.line(format!(
                    "pthread_create(&threads[{}], NULL, thread_{}, NULL);",
                    i, thread.ident
                ));
            }
            out.blank();
            for i in 0..program.threads.len() {
                out.line(format!("pthread_join(threads[{}], NULL);", i));
            }
            out.blank();
        }
        out.line("pthread_mutex_destroy(&lock);");
        out.line("return 0;");
        out.dedent();
        out.line("}");
        out.finish()
    }
}

/// Backend for languages with no generator yet: emits a single comment.
pub struct PlaceholderBackend {
    language: Language,
}

impl PlaceholderBackend {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl Backend for PlaceholderBackend {
    fn language(&self) -> Language {
        self.language
    }

    fn render(&self, _program: &Program) -> String {
        let name = match self.language {
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::C => "C",
            Language::CSharp => "C#",
            Language::Python => "Python",
        };
        format!("// {} code generation is not implemented yet\n", name)
    }
}
