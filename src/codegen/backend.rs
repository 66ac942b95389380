use super::csharp::CSharpBackend;
use super::language::Language;
use super::partial::{CSkeletonBackend, PlaceholderBackend};
use super::python::PythonBackend;
use super::statement::{Arm, Condition, Program, Statement, ThreadBody, ThreadProgram};
use super::writer::CodeWriter;
use crate::flow::Operand;

/// A target-language backend that turns an emitted `Program` into source text.
pub trait Backend: Send + Sync {
    fn language(&self) -> Language;

    /// Names that may not be used as shared variable names.
    fn reserved_words(&self) -> &'static [&'static str] {
        &[]
    }

    /// Names the backend declares for the thread whose identifier is `ident`.
    /// Shared variables may not reuse them.
    fn thread_helpers(&self, _ident: &str) -> Vec<String> {
        Vec::new()
    }

    fn render(&self, program: &Program) -> String;
}

/// Syntax templates for backends whose output goes through the shared
/// statement driver, [`render_structured`].
///
/// Each `open_*` method leaves the writer one level deeper and the matching
/// `close_*` method restores the depth.
pub trait SyntaxTemplates {
    fn indent_unit(&self) -> &'static str {
        "    "
    }

    fn comment(&self, text: &str) -> String;

    /// File header, lock object and zero-initialized shared variables.
    fn prologue(&self, out: &mut CodeWriter, variables: &[String]);
    fn open_thread(&self, out: &mut CodeWriter, thread: &ThreadProgram, variables: &[String]);
    fn close_thread(&self, out: &mut CodeWriter);
    fn missing_start(&self, out: &mut CodeWriter);
    /// Entry point that starts every thread and waits for all of them.
    fn epilogue(&self, out: &mut CodeWriter, threads: &[ThreadProgram]);

    fn assign(&self, target: &str, value: &str) -> String;
    fn input(&self, out: &mut CodeWriter, variable: &str);
    fn output(&self, variable: &str) -> String;

    fn open_lock(&self, out: &mut CodeWriter);
    fn close_lock(&self, out: &mut CodeWriter);

    fn open_if(&self, out: &mut CodeWriter, condition: &Condition);
    fn open_else(&self, out: &mut CodeWriter);
    fn close_if(&self, out: &mut CodeWriter);

    fn open_loop(&self, out: &mut CodeWriter);
    /// Leaves the loop when its body runs to completion.
    fn close_loop(&self, out: &mut CodeWriter);
    fn continue_statement(&self) -> &'static str;

    /// Called for a suite that received no statements.
    fn empty_suite(&self, _out: &mut CodeWriter) {}
}

/// Renders a whole program through a backend's syntax templates.
pub fn render_structured<T: SyntaxTemplates + ?Sized>(templates: &T, program: &Program) -> String {
    let mut out = CodeWriter::new(templates.indent_unit());
    templates.prologue(&mut out, &program.variables);
    for thread in &program.threads {
        templates.open_thread(&mut out, thread, &program.variables);
        match &thread.body {
            ThreadBody::MissingStart => templates.missing_start(&mut out),
            ThreadBody::Statements(statements) => suite(templates, &mut out, statements),
        }
        templates.close_thread(&mut out);
    }
    templates.epilogue(&mut out, &program.threads);
    out.finish()
}

fn suite<T: SyntaxTemplates + ?Sized>(t: &T, out: &mut CodeWriter, statements: &[Statement]) {
    let before = out.statements();
    for statement in statements {
        render_statement(t, out, statement);
    }
    if out.statements() == before {
        t.empty_suite(out);
    }
}

fn render_statement<T: SyntaxTemplates + ?Sized>(t: &T, out: &mut CodeWriter, statement: &Statement) {
    match statement {
        Statement::Assign { target, value } => {
            let value = match value {
                Operand::Literal(n) => n.to_string(),
                Operand::Variable(name) => name.clone(),
            };
            out.line(t.assign(target, &value));
        }
        Statement::Input { variable } => t.input(out, variable),
        Statement::Output { variable } => out.line(t.output(variable)),
        Statement::Locked(body) => {
            t.open_lock(out);
            suite(t, out, body);
            t.close_lock(out);
        }
        Statement::Branch {
            condition,
            then_arm,
            else_arm,
        } => {
            t.open_if(out, condition);
            render_arm(t, out, then_arm, "Yes");
            t.open_else(out);
            render_arm(t, out, else_arm, "No");
            t.close_if(out);
        }
        Statement::Loop { header, body } => {
            out.comment(t.comment(&format!("Loop back-edges target block {}", header)));
            t.open_loop(out);
            suite(t, out, body);
            t.close_loop(out);
        }
        Statement::Continue { target } => {
            out.comment(t.comment(&format!("Back to block {} (already visited)", target)));
            out.line(t.continue_statement());
        }
    }
}

fn render_arm<T: SyntaxTemplates + ?Sized>(t: &T, out: &mut CodeWriter, arm: &Arm, side: &str) {
    match arm {
        Arm::Connected(statements) => {
            out.comment(t.comment(&format!("{} branch", side)));
            suite(t, out, statements);
        }
        Arm::Missing => {
            out.comment(t.comment(&format!("{} branch not connected", side)));
            t.empty_suite(out);
        }
    }
}

/// Returns the backend for a language.
pub fn backend_for(language: Language) -> Box<dyn Backend> {
    match language {
        Language::Python => Box::new(PythonBackend),
        Language::CSharp => Box::new(CSharpBackend),
        Language::C => Box::new(CSkeletonBackend),
        Language::Cpp | Language::Java => Box::new(PlaceholderBackend::new(language)),
    }
}
