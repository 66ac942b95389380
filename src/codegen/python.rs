use super::backend::{Backend, SyntaxTemplates, render_structured};
use super::language::Language;
use super::statement::{Condition, Program, ThreadProgram};
use super::writer::CodeWriter;
use itertools::Itertools;

const RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield", "lock", "threading", "print", "input", "int",
];

/// Python 3 backend built on `threading.Thread` and a single `threading.Lock`.
pub struct PythonBackend;

impl Backend for PythonBackend {
    fn language(&self) -> Language {
        Language::Python
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        RESERVED
    }

    fn thread_helpers(&self, ident: &str) -> Vec<String> {
        vec![format!("thread_{}", ident), format!("t{}", ident)]
    }

    fn render(&self, program: &Program) -> String {
        render_structured(self, program)
    }
}

impl SyntaxTemplates for PythonBackend {
    fn comment(&self, text: &str) -> String {
        format!("# {}", text)
    }

    fn prologue(&self, out: &mut CodeWriter, variables: &[String]) {
        out.comment("#!/usr/bin/env python3");
        out.comment("# Generated from a flowchart");
        out.line("import threading");
        out.blank();
        out.comment("# Shared variables");
        out.line("lock = threading.Lock()");
        for variable in variables {
            out.line(format!("{} = 0", variable));
        }
        out.blank();
    }

    fn open_thread(&self, out: &mut CodeWriter, thread: &ThreadProgram, variables: &[String]) {
        out.line(format!("def thread_{}():", thread.ident));
        out.indent();
        if !variables.is_empty() {
            out.line(format!("global {}", variables.iter().join(", ")));
            out.blank();
        }
    }

    fn close_thread(&self, out: &mut CodeWriter) {
        out.dedent();
        out.blank();
    }

    fn missing_start(&self, out: &mut CodeWriter) {
        out.comment("# Start block not found");
        out.line("pass");
    }

    fn epilogue(&self, out: &mut CodeWriter, threads: &[ThreadProgram]) {
        out.comment("# Create threads");
        for thread in threads {
            out.line(format!(
                "t{id} = threading.Thread(target=thread_{id})",
                id = thread.ident
            ));
        }
        out.blank();
        out.comment("# Start threads");
        for thread in threads {
            out.line(format!("t{}.start()", thread.ident));
        }
        out.blank();
        out.comment("# Wait for threads to finish");
        for thread in threads {
            out.line(format!("t{}.join()", thread.ident));
        }
    }

    fn assign(&self, target: &str, value: &str) -> String {
        format!("{} = {}", target, value)
    }

    fn input(&self, out: &mut CodeWriter, variable: &str) {
        out.line(format!("{} = int(input())", variable));
    }

    fn output(&self, variable: &str) -> String {
        format!("print({})", variable)
    }

    fn open_lock(&self, out: &mut CodeWriter) {
        out.line("with lock:");
        out.indent();
    }

    fn close_lock(&self, out: &mut CodeWriter) {
        out.dedent();
    }

    fn open_if(&self, out: &mut CodeWriter, condition: &Condition) {
        out.line(format!(
            "if {} {} {}:",
            condition.variable,
            condition.comparator.symbol(),
            condition.value
        ));
        out.indent();
    }

    fn open_else(&self, out: &mut CodeWriter) {
        out.dedent();
        out.line("else:");
        out.indent();
    }

    fn close_if(&self, out: &mut CodeWriter) {
        out.dedent();
    }

    fn open_loop(&self, out: &mut CodeWriter) {
        out.line("while True:");
        out.indent();
    }

    fn close_loop(&self, out: &mut CodeWriter) {
        out.line("break");
        out.dedent();
    }

    fn continue_statement(&self) -> &'static str {
        "continue"
    }

    fn empty_suite(&self, out: &mut CodeWriter) {
        out.line("pass");
    }
}
