use super::backend::{Backend, SyntaxTemplates, render_structured};
use super::language::Language;
use super::statement::{Condition, Program, ThreadProgram};
use super::writer::CodeWriter;

const RESERVED: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while", "_lock", "Program", "Main", "Console", "Task", "tasks",
];

/// C# backend: one static method per thread, `Task.Run` to start them and a
/// `lock` statement over a single shared object.
pub struct CSharpBackend;

impl Backend for CSharpBackend {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        RESERVED
    }

    fn thread_helpers(&self, ident: &str) -> Vec<String> {
        vec![format!("Thread_{}", ident)]
    }

    fn render(&self, program: &Program) -> String {
        render_structured(self, program)
    }
}

impl CSharpBackend {
    fn open_block(out: &mut CodeWriter) {
        out.line("{");
        out.indent();
    }

    fn close_block(out: &mut CodeWriter) {
        out.dedent();
        out.line("}");
    }
}

impl SyntaxTemplates for CSharpBackend {
    fn comment(&self, text: &str) -> String {
        format!("// {}", text)
    }

    fn prologue(&self, out: &mut CodeWriter, variables: &[String]) {
        out.comment("// Generated from a flowchart");
        out.line("using System;");
        out.line("using System.Threading;");
        out.line("using System.Threading.Tasks;");
        out.blank();
        out.line("namespace FlowchartGeneratedCode");
        Self::open_block(out);
        out.line("class Program");
        Self::open_block(out);
        out.comment("// Shared variables");
        out.line("private static readonly object _lock = new object();");
        for variable in variables {
            out.line(format!("private static int {} = 0;", variable));
        }
        out.blank();
    }

    fn open_thread(&self, out: &mut CodeWriter, thread: &ThreadProgram, _variables: &[String]) {
        out.line(format!("static void Thread_{}()", thread.ident));
        Self::open_block(out);
    }

    fn close_thread(&self, out: &mut CodeWriter) {
        Self::close_block(out);
        out.blank();
    }

    fn missing_start(&self, out: &mut CodeWriter) {
        out.comment("// Start block not found");
    }

    fn epilogue(&self, out: &mut CodeWriter, threads: &[ThreadProgram]) {
        out.line("static void Main(string[] args)");
        Self::open_block(out);
        out.comment("// Start every thread and wait for all of them to finish");
        out.line("var tasks = new Task[]");
        Self::open_block(out);
        for thread in threads {
            out.line(format!("Task.Run(() => Thread_{}()),", thread.ident));
        }
        out.dedent();
        out.line("};");
        out.line("Task.WaitAll(tasks);");
        Self::close_block(out);
        // class Program
        Self::close_block(out);
        // namespace
        Self::close_block(out);
    }

    fn assign(&self, target: &str, value: &str) -> String {
        format!("{} = {};", target, value)
    }

    fn input(&self, out: &mut CodeWriter, variable: &str) {
        out.line(format!(
            "{} = int.Parse(Console.ReadLine() ?? \"0\");",
            variable
        ));
    }

    fn output(&self, variable: &str) -> String {
        format!("Console.WriteLine({});", variable)
    }

    fn open_lock(&self, out: &mut CodeWriter) {
        out.line("lock (_lock)");
        Self::open_block(out);
    }

    fn close_lock(&self, out: &mut CodeWriter) {
        Self::close_block(out);
    }

    fn open_if(&self, out: &mut CodeWriter, condition: &Condition) {
        out.line(format!(
            "if ({} {} {})",
            condition.variable,
            condition.comparator.symbol(),
            condition.value
        ));
        Self::open_block(out);
    }

    fn open_else(&self, out: &mut CodeWriter) {
        Self::close_block(out);
        out.line("else");
        Self::open_block(out);
    }

    fn close_if(&self, out: &mut CodeWriter) {
        Self::close_block(out);
    }

    fn open_loop(&self, out: &mut CodeWriter) {
        out.line("while (true)");
        Self::open_block(out);
    }

    fn close_loop(&self, out: &mut CodeWriter) {
        out.line("break;");
        Self::close_block(out);
    }

    fn continue_statement(&self) -> &'static str {
        "continue;"
    }
}
